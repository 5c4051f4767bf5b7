//! `Condition` — One `key:value` entry of a rule
//!
//! The rule language encodes every condition as a string key. Parsing turns
//! that key into a tagged variant once, so evaluation never re-inspects
//! string prefixes.
//!
//! | Key         | Variant                  | Fires when                          |
//! |-------------|--------------------------|-------------------------------------|
//! | `invariant` | [`Condition::Invariant`] | always (short-circuits the rule)    |
//! | `default`   | [`Condition::Default`]   | the parameter is absent             |
//! | `>N`        | [`Condition::AtLeast`]   | original parses as integer `>= N`   |
//! | `<N`        | [`Condition::AtMost`]    | original parses as integer `<= N`   |
//! | anything    | [`Condition::Equals`]    | original string-equals the key      |

use std::cmp::Ordering;
use std::fmt;

/// Reserved key for the unconditional entry.
pub const INVARIANT_KEY: &str = "invariant";

/// Reserved key for the absent-parameter entry.
pub const DEFAULT_KEY: &str = "default";

/// Numeric bound of a threshold condition.
///
/// Holds the raw text after the `>`/`<` prefix. The text is converted to an
/// integer when the condition is evaluated, so `x=>abc:1` parses but fails
/// evaluation once a present value reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    raw: String,
}

impl Bound {
    /// Create a bound from the text following the comparison prefix.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Returns the raw bound text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parse the bound as a 64-bit integer.
    ///
    /// Returns `None` when the text is not a decimal integer.
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        self.raw.parse().ok()
    }
}

/// A single condition → replacement entry of a [`Rule`](crate::Rule).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Always applies, regardless of the request. Dominates every other entry.
    Invariant(String),

    /// Applies only when the parameter is absent from the request.
    Default(String),

    /// `>N`: applies when the original value is an integer `>= N`.
    AtLeast {
        /// Threshold (inclusive).
        bound: Bound,
        /// Replacement value.
        value: String,
    },

    /// `<N`: applies when the original value is an integer `<= N`.
    AtMost {
        /// Threshold (inclusive).
        bound: Bound,
        /// Replacement value.
        value: String,
    },

    /// Applies when the original value equals `key` exactly.
    Equals {
        /// Expected original value.
        key: String,
        /// Replacement value.
        value: String,
    },
}

impl Condition {
    /// Classify a `key:value` token by its key.
    ///
    /// # Example
    ///
    /// ```
    /// use reqsan::Condition;
    ///
    /// assert!(matches!(Condition::from_token(">100", "100"), Condition::AtLeast { .. }));
    /// assert!(matches!(Condition::from_token("default", "5"), Condition::Default(_)));
    /// assert!(matches!(Condition::from_token("alle", "all"), Condition::Equals { .. }));
    /// ```
    #[must_use]
    pub fn from_token(key: &str, value: &str) -> Self {
        let value = value.to_owned();
        if key == INVARIANT_KEY {
            Self::Invariant(value)
        } else if key == DEFAULT_KEY {
            Self::Default(value)
        } else if let Some(raw) = key.strip_prefix('>') {
            Self::AtLeast {
                bound: Bound::new(raw),
                value,
            }
        } else if let Some(raw) = key.strip_prefix('<') {
            Self::AtMost {
                bound: Bound::new(raw),
                value,
            }
        } else {
            Self::Equals {
                key: key.to_owned(),
                value,
            }
        }
    }

    /// Render the condition key as written in the rule language.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Invariant(_) => INVARIANT_KEY.to_owned(),
            Self::Default(_) => DEFAULT_KEY.to_owned(),
            Self::AtLeast { bound, .. } => format!(">{}", bound.raw()),
            Self::AtMost { bound, .. } => format!("<{}", bound.raw()),
            Self::Equals { key, .. } => key.clone(),
        }
    }

    /// Returns `true` if both conditions have the same rule-language key.
    ///
    /// Same result as comparing [`Condition::key`], without allocating.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Invariant(_), Self::Invariant(_)) | (Self::Default(_), Self::Default(_)) => {
                true
            }
            (Self::AtLeast { bound: a, .. }, Self::AtLeast { bound: b, .. })
            | (Self::AtMost { bound: a, .. }, Self::AtMost { bound: b, .. }) => a.raw() == b.raw(),
            (Self::Equals { key: a, .. }, Self::Equals { key: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Returns the replacement value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Invariant(value)
            | Self::Default(value)
            | Self::AtLeast { value, .. }
            | Self::AtMost { value, .. }
            | Self::Equals { value, .. } => value,
        }
    }

    /// Replace the replacement value, keeping the condition.
    pub(crate) fn set_value(&mut self, new_value: String) {
        match self {
            Self::Invariant(value)
            | Self::Default(value)
            | Self::AtLeast { value, .. }
            | Self::AtMost { value, .. }
            | Self::Equals { value, .. } => *value = new_value,
        }
    }

    /// Returns the numeric bound and the ordering that satisfies it,
    /// or `None` for non-threshold conditions.
    #[must_use]
    pub fn threshold(&self) -> Option<(&Bound, Ordering)> {
        match self {
            Self::AtLeast { bound, .. } => Some((bound, Ordering::Greater)),
            Self::AtMost { bound, .. } => Some((bound, Ordering::Less)),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key(), self.value())
    }
}

/// Compare an integer against a threshold.
///
/// Equality satisfies either direction, so `>N` and `<N` both accept `N`.
#[inline]
#[must_use]
pub(crate) fn satisfies(original: i64, bound: i64, direction: Ordering) -> bool {
    let cmp = original.cmp(&bound);
    cmp == direction || cmp == Ordering::Equal
}
