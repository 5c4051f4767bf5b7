//! Evaluation trace types for debugging rule behavior.
//!
//! Use [`RuleSet::evaluate_with_trace`](crate::RuleSet::evaluate_with_trace)
//! to see why each parameter was, or was not, rewritten.
//!
//! # Example
//!
//! ```
//! use reqsan::{ParamMap, RuleSet};
//!
//! let rules = RuleSet::parse(["rows=>100:100"]).unwrap();
//! let trace = rules.evaluate_with_trace(&ParamMap::new().with("rows", "500")).unwrap();
//! for step in &trace.steps {
//!     println!("{}: {:?}", step.param, step.outcome);
//! }
//! assert_eq!(trace.overlay.get("rows"), Some("100"));
//! ```

use crate::Overlay;
use std::fmt;

/// What a single rule decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The rule's `invariant` entry applied.
    Invariant(String),
    /// The parameter was absent and the `default` entry applied.
    Default(String),
    /// A condition matched the original value.
    Matched {
        /// Position of the condition within the rule.
        index: usize,
        /// The condition key as written (`>100`, `foo`, ...).
        condition: String,
        /// The replacement value.
        value: String,
    },
    /// The parameter was present but no condition matched.
    NoMatch,
    /// The parameter was absent and the rule has no `default`.
    Absent,
}

impl Outcome {
    /// Returns the replacement value, if the rule fired.
    #[must_use]
    pub fn replacement(&self) -> Option<&str> {
        match self {
            Self::Invariant(value) | Self::Default(value) | Self::Matched { value, .. } => {
                Some(value)
            }
            Self::NoMatch | Self::Absent => None,
        }
    }

    /// Returns `true` if the rule produced a replacement.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.replacement().is_some()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invariant(value) => write!(f, "invariant -> {value}"),
            Self::Default(value) => write!(f, "default -> {value}"),
            Self::Matched {
                index,
                condition,
                value,
            } => write!(f, "matched [{index}] {condition} -> {value}"),
            Self::NoMatch => f.write_str("no match"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// One rule's evaluation in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTrace {
    /// The parameter the rule targets.
    pub param: String,
    /// The primary original value, if the request had one.
    pub original: Option<String>,
    /// What the rule decided.
    pub outcome: Outcome,
    /// Indices of `>N`/`<N` conditions passed over because the original value
    /// is not an integer.
    pub skipped: Vec<usize>,
}

/// Trace of a full [`RuleSet`](crate::RuleSet) evaluation.
///
/// # INV: `overlay` == `evaluate()` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalTrace {
    /// The computed overlay (identical to what `evaluate()` returns).
    pub overlay: Overlay,
    /// One step per rule, in parameter order.
    pub steps: Vec<ParamTrace>,
}

impl EvalTrace {
    /// Find the step for `param`.
    #[must_use]
    pub fn step(&self, param: &str) -> Option<&ParamTrace> {
        self.steps.iter().find(|s| s.param == param)
    }
}
