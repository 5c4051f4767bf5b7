//! `Rule` — Ordered conditions for one target parameter
//!
//! A rule is evaluated against the parameter's original value with
//! first-match-wins semantics. `invariant` short-circuits everything,
//! `default` only fires for an absent parameter, and the remaining entries are
//! tried in the order they were written.

use crate::condition::{satisfies, Condition};
use crate::trace::Outcome;
use crate::SanitizeError;
use std::fmt;

/// Ordered condition → replacement entries for a single parameter.
///
/// # INV: one entry per key
///
/// A condition key appears at most once. Pushing a condition whose key is
/// already present replaces the earlier value in place, which also means a
/// rule holds at most one `invariant` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    conditions: Vec<Condition>,
}

impl Rule {
    /// Create an empty rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rule with a single `invariant` entry.
    pub fn invariant(value: impl Into<String>) -> Self {
        Self {
            conditions: vec![Condition::Invariant(value.into())],
        }
    }

    /// Append a condition (builder pattern).
    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.push(condition);
        self
    }

    /// Append a condition, replacing the value of an existing entry with the
    /// same key.
    pub fn push(&mut self, condition: Condition) {
        match self.conditions.iter_mut().find(|c| c.same_key(&condition)) {
            Some(existing) => existing.set_value(condition.value().to_owned()),
            None => self.conditions.push(condition),
        }
    }

    /// Returns the conditions in evaluation order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the `invariant` value, if the rule has one.
    #[must_use]
    pub fn invariant_value(&self) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Invariant(value) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Returns the `default` value, if the rule has one.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Default(value) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Returns the number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if the rule has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Apply this rule to the original value of `param`.
    ///
    /// Returns the outcome plus the indices of numeric conditions that were
    /// skipped because `original` is not an integer.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::InvalidThreshold`] when a `>N`/`<N` condition
    /// is reached whose `N` is not an integer.
    pub(crate) fn apply(
        &self,
        param: &str,
        original: Option<&str>,
    ) -> Result<(Outcome, Vec<usize>), SanitizeError> {
        let mut skipped = Vec::new();

        if let Some(value) = self.invariant_value() {
            tracing::debug!(param, value, "applying invariant");
            return Ok((Outcome::Invariant(value.to_owned()), skipped));
        }

        let Some(original) = original else {
            let outcome = match self.default_value() {
                Some(value) => {
                    tracing::debug!(param, value, "parameter absent, applying default");
                    Outcome::Default(value.to_owned())
                }
                None => Outcome::Absent,
            };
            return Ok((outcome, skipped));
        };

        let mut as_int: Option<Option<i64>> = None;

        for (index, condition) in self.conditions.iter().enumerate() {
            let fired = match condition {
                Condition::Invariant(_) | Condition::Default(_) => false,
                Condition::Equals { key, .. } => key == original,
                Condition::AtLeast { .. } | Condition::AtMost { .. } => {
                    let Some((bound, direction)) = condition.threshold() else {
                        continue;
                    };
                    let Some(bound) = bound.value() else {
                        tracing::warn!(param, condition = %condition, "non-numeric threshold");
                        return Err(SanitizeError::InvalidThreshold {
                            param: param.to_owned(),
                            condition: condition.to_string(),
                        });
                    };
                    match *as_int.get_or_insert_with(|| original.parse().ok()) {
                        Some(value) => satisfies(value, bound, direction),
                        None => {
                            tracing::debug!(
                                param,
                                original,
                                condition = %condition,
                                "value is not a number, skipping threshold"
                            );
                            skipped.push(index);
                            false
                        }
                    }
                }
            };

            if fired {
                tracing::debug!(param, original, condition = %condition, "rule hit");
                return Ok((
                    Outcome::Matched {
                        index,
                        condition: condition.key(),
                        value: condition.value().to_owned(),
                    },
                    skipped,
                ));
            }
        }

        Ok((Outcome::NoMatch, skipped))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

impl FromIterator<Condition> for Rule {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut rule = Rule::new();
        for condition in iter {
            rule.push(condition);
        }
        rule
    }
}
