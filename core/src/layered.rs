//! `LayeredParams` — Overlay-over-original parameter view
//!
//! The sanitizer never mutates the request. It layers the computed
//! [`Overlay`](crate::Overlay) over the original parameters and hands the host
//! this view as the effective parameter set.

use crate::ParamSource;
use std::collections::HashSet;

/// Read-only merge of two parameter sources, `params` taking priority.
///
/// # INV: names are unique
///
/// [`ParamSource::names`] yields each name once even when both layers know it:
/// overlay names first, then original names not already seen.
///
/// # Example
///
/// ```
/// use reqsan::{LayeredParams, Overlay, ParamMap, ParamSource};
///
/// let original = ParamMap::new().with("rows", "5000").with("q", "rust");
/// let overlay: Overlay = [("rows", "100")].into_iter().collect();
///
/// let view = LayeredParams::new(overlay, &original);
/// assert_eq!(view.get("rows"), Some("100"));
/// assert_eq!(view.get("q"), Some("rust"));
/// assert_eq!(view.names(), vec!["rows", "q"]);
/// ```
#[derive(Debug, Clone)]
pub struct LayeredParams<P, D> {
    params: P,
    defaults: D,
}

impl<P: ParamSource, D: ParamSource> LayeredParams<P, D> {
    /// Layer `params` over `defaults`.
    pub fn new(params: P, defaults: D) -> Self {
        Self { params, defaults }
    }

    /// Returns the priority layer.
    pub fn overlay(&self) -> &P {
        &self.params
    }

    /// Returns the fallback layer.
    pub fn original(&self) -> &D {
        &self.defaults
    }
}

impl<P: ParamSource, D: ParamSource> ParamSource for LayeredParams<P, D> {
    fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).or_else(|| self.defaults.get(name))
    }

    fn get_all(&self, name: &str) -> Option<&[String]> {
        self.params
            .get_all(name)
            .or_else(|| self.defaults.get_all(name))
    }

    fn names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.params
            .names()
            .into_iter()
            .chain(self.defaults.names())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}
