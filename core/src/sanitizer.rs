//! Request pipeline boundary.
//!
//! A host search server calls [`RequestSanitizer::prepare`] before handling a
//! request and continues with [`Prepared::params`] as the effective parameter
//! set. Hosts that manage rules themselves can use [`sanitize`] and [`merge`]
//! directly.

use crate::params::get_bool;
use crate::{LayeredParams, Overlay, ParamSource, RuleSet, SanitizeError, SanitizerConfig};

/// Name of the per-request flag parameter; `request_sanitizer=false` skips
/// sanitization for that request.
pub const COMPONENT_NAME: &str = "request_sanitizer";

/// Name of the multi-valued request parameter carrying raw rules.
pub const SANITIZE_PARAM: &str = "sanitize";

/// Parse `raw_rules` and evaluate them against `original`.
///
/// # Errors
///
/// Returns a malformed-rule [`SanitizeError`]; nothing is partially applied.
///
/// # Example
///
/// ```
/// use reqsan::{merge, sanitize, ParamMap, ParamSource};
///
/// let original = ParamMap::new().with("rows", "5000");
/// let overlay = sanitize(["rows=>100:100"], &original).unwrap();
/// let params = merge(overlay, &original);
/// assert_eq!(params.get("rows"), Some("100"));
/// ```
pub fn sanitize<I, S, P>(raw_rules: I, original: &P) -> Result<Overlay, SanitizeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: ParamSource + ?Sized,
{
    RuleSet::parse(raw_rules)?.evaluate(original)
}

/// Layer `overlay` over `original`, overlay values taking priority.
pub fn merge<P: ParamSource>(overlay: Overlay, original: P) -> LayeredParams<Overlay, P> {
    LayeredParams::new(overlay, original)
}

/// Result of [`RequestSanitizer::prepare`].
#[derive(Debug, Clone)]
pub struct Prepared<P> {
    params: LayeredParams<Overlay, P>,
}

impl<P: ParamSource> Prepared<P> {
    /// The effective parameters for the rest of the request.
    pub fn params(&self) -> &LayeredParams<Overlay, P> {
        &self.params
    }

    /// The replacement values that were applied.
    pub fn overlay(&self) -> &Overlay {
        self.params.overlay()
    }

    /// Returns `true` if any parameter was replaced.
    pub fn is_modified(&self) -> bool {
        !self.overlay().is_empty()
    }

    /// Take the effective parameters.
    pub fn into_params(self) -> LayeredParams<Overlay, P> {
        self.params
    }
}

/// Request sanitizer: configuration plus the `prepare` hook.
///
/// Holds no per-request state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct RequestSanitizer {
    config: SanitizerConfig,
}

impl RequestSanitizer {
    /// Create a sanitizer from its configuration.
    #[must_use]
    pub fn new(config: SanitizerConfig) -> Self {
        tracing::info!(
            enabled = config.enabled,
            configured_rules = config.rules.len(),
            "initialized request sanitizer"
        );
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Returns `true` if this request should be sanitized.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::InvalidFlag`] if the request's
    /// [`COMPONENT_NAME`] parameter is not a boolean.
    pub fn is_enabled_for<P: ParamSource + ?Sized>(&self, params: &P) -> Result<bool, SanitizeError> {
        if !self.config.enabled {
            return Ok(false);
        }
        get_bool(params, COMPONENT_NAME, true)
    }

    /// Collect the raw rules for a request: request-supplied [`SANITIZE_PARAM`]
    /// values first, then the configured rules, so configured rules win for
    /// the same parameter.
    pub fn raw_rules<'a, P: ParamSource + ?Sized>(&'a self, params: &'a P) -> Vec<&'a str> {
        params
            .get_all(SANITIZE_PARAM)
            .unwrap_or_default()
            .iter()
            .chain(&self.config.rules)
            .map(String::as_str)
            .collect()
    }

    /// Compute the effective parameters for a request.
    ///
    /// When sanitization is disabled the returned view has an empty overlay.
    ///
    /// # Errors
    ///
    /// Returns a [`SanitizeError`] for a malformed rule or an invalid enable
    /// flag. Callers should reject the request as a client error.
    pub fn prepare<P: ParamSource>(&self, params: P) -> Result<Prepared<P>, SanitizeError> {
        if !self.is_enabled_for(&params)? {
            tracing::debug!("request sanitizer disabled for this request");
            return Ok(Prepared {
                params: merge(Overlay::new(), params),
            });
        }

        let rules = RuleSet::parse(self.raw_rules(&params))?;
        tracing::debug!(rules = rules.len(), "parsed sanitize rules");

        let overlay = rules.evaluate(&params)?;
        if !overlay.is_empty() {
            tracing::info!(modified = %overlay, "request parameters modified by sanitizer");
        }

        Ok(Prepared {
            params: merge(overlay, params),
        })
    }
}
