//! `ParamSource` — Read-only access to request parameters
//!
//! The sanitizer never decodes requests itself. The host hands it something
//! that implements [`ParamSource`]: a name → value(s) lookup where only the
//! first value takes part in rule matching.

use crate::SanitizeError;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Read-only, possibly multi-valued request parameters.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a parameter set can be evaluated
/// from any request-handling thread.
///
/// # Example
///
/// ```
/// use reqsan::{ParamMap, ParamSource};
///
/// let params = ParamMap::new().with("fq", "a").with("fq", "b");
/// assert_eq!(params.get("fq"), Some("a"));
/// assert_eq!(params.get_all("fq").map(<[String]>::len), Some(2));
/// assert_eq!(params.get("missing"), None);
/// ```
pub trait ParamSource: Send + Sync + Debug {
    /// Returns the primary (first) value of `name`, or `None` if absent.
    fn get(&self, name: &str) -> Option<&str>;

    /// Returns every value of `name`, or `None` if absent.
    fn get_all(&self, name: &str) -> Option<&[String]>;

    /// Returns each known parameter name exactly once, in a stable order.
    fn names(&self) -> Vec<&str>;

    /// Returns `true` if `name` has at least one value.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn get(&self, name: &str) -> Option<&str> {
        (**self).get(name)
    }

    fn get_all(&self, name: &str) -> Option<&[String]> {
        (**self).get_all(name)
    }

    fn names(&self) -> Vec<&str> {
        (**self).names()
    }
}

impl ParamSource for Box<dyn ParamSource> {
    fn get(&self, name: &str) -> Option<&str> {
        (**self).get(name)
    }

    fn get_all(&self, name: &str) -> Option<&[String]> {
        (**self).get_all(name)
    }

    fn names(&self) -> Vec<&str> {
        (**self).names()
    }
}

/// Owned multi-valued parameter map, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    values: BTreeMap<String, Vec<String>>,
}

impl ParamMap {
    /// Create an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `name` (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Build a map from `(name, value)` pairs; repeated names accumulate values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.insert(name, value);
        }
        map
    }

    /// Returns the number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the map has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParamSource for ParamMap {
    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    fn get_all(&self, name: &str) -> Option<&[String]> {
        self.values
            .get(name)
            .filter(|v| !v.is_empty())
            .map(Vec::as_slice)
    }

    fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Read a boolean flag parameter.
///
/// Accepts `true`/`on`/`yes` and `false`/`off`/`no` (case-insensitive).
/// Returns `default` when the parameter is absent.
///
/// # Errors
///
/// Returns [`SanitizeError::InvalidFlag`] for any other value.
pub fn get_bool<P: ParamSource + ?Sized>(
    params: &P,
    name: &str,
    default: bool,
) -> Result<bool, SanitizeError> {
    let Some(value) = params.get(name) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(SanitizeError::InvalidFlag {
            param: name.to_owned(),
            value: value.to_owned(),
        }),
    }
}
