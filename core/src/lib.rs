//! reqsan - Declarative request-parameter sanitization
//!
//! Rewrites incoming request parameters according to compact, per-parameter
//! rules before the request reaches the search handler.
//!
//! # Architecture
//!
//! ```text
//! raw rules ["rows=>100:100", ...]
//!         ↓ parse_rules()
//! RuleSet { param → Rule [Condition, ...] }
//!         ↓ evaluate(original)
//! Overlay { param → replacement }
//!         ↓ merge(overlay, original)
//! LayeredParams (overlay first, original fallback)
//! ```
//!
//! - [`Condition`] — Tagged rule entry (`invariant`, `default`, `>N`, `<N`, literal)
//! - [`Rule`] — Ordered conditions for one parameter, first-match-wins
//! - [`RuleSet`] — Rules keyed by parameter; parse + evaluate
//! - [`ParamSource`] — Read-only request parameters (multi-valued)
//! - [`Overlay`] — Computed replacement values
//! - [`LayeredParams`] — Overlay-over-original view with unique names
//! - [`RequestSanitizer`] — Request pipeline hook (enable flag, rule collection)
//!
//! # Rule language
//!
//! | Rule | Effect |
//! |------|--------|
//! | `rows=25` | always `rows=25` (same as `rows=invariant:25`) |
//! | `rows=>100:100` | cap `rows` at 100 |
//! | `echoParams=alle:all eksplisitt:explicit` | map values |
//! | `debugQuery=default:true` | set when absent |
//! | `multi=0:1 >10:10 default:5` | first matching entry wins |
//!
//! # Key Invariants
//!
//! 1. **Invariant dominates**: an `invariant` entry applies regardless of the
//!    request and no other entry of that rule is consulted.
//!
//! 2. **Non-numeric → skip**: a `>N`/`<N` condition against a non-integer value
//!    does not fire and evaluation moves on. A non-integer `N` is an error.
//!
//! 3. **All-or-nothing**: a malformed rule aborts the whole step; no partial
//!    overlay is ever applied.
//!
//! # Example
//!
//! ```
//! use reqsan::prelude::*;
//!
//! let rules = RuleSet::parse([
//!     "rows=>100:100",
//!     "echoParams=alle:all eksplisitt:explicit",
//!     "debugQuery=default:false",
//! ])
//! .unwrap();
//!
//! let original = ParamMap::new()
//!     .with("q", "rust")
//!     .with("rows", "5000")
//!     .with("echoParams", "alle");
//!
//! let overlay = rules.evaluate(&original).unwrap();
//! let params = merge(overlay, &original);
//!
//! assert_eq!(params.get("rows"), Some("100"));
//! assert_eq!(params.get("echoParams"), Some("all"));
//! assert_eq!(params.get("debugQuery"), Some("false"));
//! assert_eq!(params.get("q"), Some("rust"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod condition;
mod config;
mod layered;
mod overlay;
mod params;
mod parser;
mod rule;
mod rule_set;
mod sanitizer;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Rule model
pub use condition::{Bound, Condition, DEFAULT_KEY, INVARIANT_KEY};
pub use rule::Rule;
pub use rule_set::RuleSet;

// Parsing
pub use parser::{parse_body, parse_rule, parse_rules};

// Parameters
pub use layered::LayeredParams;
pub use overlay::Overlay;
pub use params::{get_bool, ParamMap, ParamSource};

// Pipeline boundary
pub use config::SanitizerConfig;
pub use sanitizer::{
    merge, sanitize, Prepared, RequestSanitizer, COMPONENT_NAME, SANITIZE_PARAM,
};

// Trace types
pub use trace::{EvalTrace, Outcome, ParamTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use reqsan::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Pipeline
        merge,
        parse_rules,
        sanitize,
        // Rule model
        Condition,
        EvalTrace,
        // Parameters
        LayeredParams,
        Outcome,
        Overlay,
        ParamMap,
        ParamSource,
        RequestSanitizer,
        Rule,
        RuleSet,
        // Errors
        SanitizeError,
        SanitizerConfig,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Expected shape of a rule, quoted in error messages.
const RULE_FORMAT: &str = "sanitize=param=<value>";

/// Expected shape of a rule body with conditions, quoted in error messages.
const CONDITION_FORMAT: &str = "sanitize=param=from:to from:to default:val >num:num2";

/// Errors from parsing or evaluating sanitize rules.
///
/// Every variant is caused by the request or its configuration, so hosts
/// should answer with a client error (HTTP 400). A malformed rule is never
/// partially applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// A raw rule has no `=` between parameter name and body.
    MissingSeparator {
        /// The offending raw rule.
        rule: String,
    },
    /// A condition token does not split into exactly `key:value`.
    MalformedCondition {
        /// The parameter the rule targets.
        param: String,
        /// The offending token.
        token: String,
    },
    /// A `>N`/`<N` condition whose `N` is not an integer was evaluated.
    InvalidThreshold {
        /// The parameter the rule targets.
        param: String,
        /// The offending condition, as `key:value`.
        condition: String,
    },
    /// A boolean flag parameter has a non-boolean value.
    InvalidFlag {
        /// The flag parameter name.
        param: String,
        /// The value found in the request.
        value: String,
    },
}

impl SanitizeError {
    /// Returns `true` for errors caused by a structurally invalid rule.
    #[must_use]
    pub fn is_malformed_rule(&self) -> bool {
        matches!(
            self,
            Self::MissingSeparator { .. }
                | Self::MalformedCondition { .. }
                | Self::InvalidThreshold { .. }
        )
    }
}

impl std::fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator { rule } => {
                write!(
                    f,
                    "rule \"{rule}\" has no parameter name; \
                     parameter {SANITIZE_PARAM} must be on the format {RULE_FORMAT}"
                )
            }
            Self::MalformedCondition { param, token } => {
                write!(
                    f,
                    "invalid condition \"{token}\" in rule for param {param}; \
                     parameter {SANITIZE_PARAM} must be on the format {CONDITION_FORMAT}"
                )
            }
            Self::InvalidThreshold { param, condition } => {
                write!(
                    f,
                    "wrong format of replace rule for param {param}:{condition} \
                     (threshold must be an integer)"
                )
            }
            Self::InvalidFlag { param, value } => {
                write!(f, "invalid boolean value \"{value}\" for param {param}")
            }
        }
    }
}

impl std::error::Error for SanitizeError {}
