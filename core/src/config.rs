//! Sanitizer configuration.
//!
//! Deserializable from JSON/YAML with the `serde` feature:
//!
//! ```yaml
//! enabled: true
//! rules:
//!   - rows=>100:100
//!   - echoParams=alle:all eksplisitt:explicit
//!   - debugQuery=default:false
//! ```

/// Configuration for a [`RequestSanitizer`](crate::RequestSanitizer).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct SanitizerConfig {
    /// Master switch. When `false`, requests pass through untouched.
    #[cfg_attr(feature = "serde", serde(default = "default_enabled"))]
    pub enabled: bool,

    /// Raw rules applied to every request, after any request-supplied rules.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_enabled() -> bool {
    true
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    /// Create an enabled config with no configured rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configured rule (builder pattern).
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Turn the sanitizer off (builder pattern).
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
