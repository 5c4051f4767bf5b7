//! `Overlay` — Replacement values computed for one request

use crate::ParamSource;
use std::collections::BTreeMap;

/// Parameter name → single replacement value.
///
/// Built fresh by [`RuleSet::evaluate`](crate::RuleSet::evaluate) and only
/// holds parameters whose rule fired. Apply it on top of the original
/// parameters with [`merge`](crate::merge) / [`LayeredParams`](crate::LayeredParams).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    // One-element vectors so `get_all` can hand out a slice.
    values: BTreeMap<String, Vec<String>>,
}

impl Overlay {
    /// Create an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the replacement value for `name`, replacing any earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), vec![value.into()]);
    }

    /// Returns the replacement value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Returns `true` if `name` has a replacement.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of replaced parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was replaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.first().map(|v| (k.as_str(), v.as_str())))
    }
}

impl ParamSource for Overlay {
    fn get(&self, name: &str) -> Option<&str> {
        Overlay::get(self, name)
    }

    fn get_all(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overlay {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overlay = Self::new();
        for (name, value) in iter {
            overlay.insert(name, value);
        }
        overlay
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Overlay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl std::fmt::Display for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}
