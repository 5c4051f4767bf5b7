//! `RuleSet` — Parsed rules keyed by target parameter, and their evaluation

use crate::trace::{EvalTrace, ParamTrace};
use crate::{Overlay, ParamSource, Rule, SanitizeError};
use std::collections::BTreeMap;

/// Rules keyed by the parameter they rewrite.
///
/// Parameters are independent of each other, so the evaluation result does not
/// depend on iteration order. Keys are kept sorted for deterministic traces and
/// log output.
///
/// A `RuleSet` is immutable once evaluated against; it is `Send + Sync` and
/// can be shared across concurrent requests behind an `Arc`.
///
/// # Example
///
/// ```
/// use reqsan::{ParamMap, RuleSet};
///
/// let rules = RuleSet::parse(["rows=>100:100", "debugQuery=default:false"]).unwrap();
/// let params = ParamMap::new().with("rows", "5000");
///
/// let overlay = rules.evaluate(&params).unwrap();
/// assert_eq!(overlay.get("rows"), Some("100"));
/// assert_eq!(overlay.get("debugQuery"), Some("false"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw `param=body` strings. See [`parse_rules`](crate::parse_rules).
    ///
    /// # Errors
    ///
    /// Returns a malformed-rule [`SanitizeError`] for the first invalid string.
    pub fn parse<I, S>(raw: I) -> Result<Self, SanitizeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        crate::parse_rules(raw)
    }

    /// Add a rule, replacing any previous rule for the same parameter.
    pub fn insert(&mut self, param: impl Into<String>, rule: Rule) -> Option<Rule> {
        self.rules.insert(param.into(), rule)
    }

    /// Add a rule (builder pattern).
    #[must_use]
    pub fn with(mut self, param: impl Into<String>, rule: Rule) -> Self {
        self.insert(param, rule);
        self
    }

    /// Get the rule for a parameter.
    #[must_use]
    pub fn get(&self, param: &str) -> Option<&Rule> {
        self.rules.get(param)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over `(param, rule)` pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Compute the overlay of replacement values for `original`.
    ///
    /// Only parameters whose rule fires appear in the overlay; everything else
    /// passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::InvalidThreshold`] if a `>N`/`<N` condition
    /// with a non-integer `N` is reached. Evaluation stops there and no
    /// partial overlay is returned.
    pub fn evaluate<P: ParamSource + ?Sized>(&self, original: &P) -> Result<Overlay, SanitizeError> {
        let mut overlay = Overlay::new();
        for (param, rule) in &self.rules {
            let (outcome, _) = rule.apply(param, original.get(param))?;
            if let Some(value) = outcome.replacement() {
                overlay.insert(param.clone(), value.to_owned());
            }
        }
        Ok(overlay)
    }

    /// Evaluate with a full trace of every rule's decision.
    ///
    /// # INV: `trace.overlay` == `evaluate()` result
    ///
    /// # Errors
    ///
    /// Same as [`RuleSet::evaluate`].
    pub fn evaluate_with_trace<P: ParamSource + ?Sized>(
        &self,
        original: &P,
    ) -> Result<EvalTrace, SanitizeError> {
        let mut overlay = Overlay::new();
        let mut steps = Vec::with_capacity(self.rules.len());

        for (param, rule) in &self.rules {
            let value = original.get(param);
            let (outcome, skipped) = rule.apply(param, value)?;
            if let Some(replacement) = outcome.replacement() {
                overlay.insert(param.clone(), replacement.to_owned());
            }
            steps.push(ParamTrace {
                param: param.clone(),
                original: value.map(str::to_owned),
                outcome,
                skipped,
            });
        }

        Ok(EvalTrace { overlay, steps })
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = (&'a String, &'a Rule);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<(String, Rule)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (String, Rule)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, Outcome, ParamMap};

    fn rules() -> RuleSet {
        RuleSet::parse([
            "set=123",
            "max=>1000:1000",
            "case=foo:bar from:to",
            "invar=invariant:myinvariant",
            "def=default:mydefault",
            "multi=0:1 >10:10 default:5",
        ])
        .unwrap()
    }

    /// Evaluate with only `param` set (or nothing, for `None`) and return the
    /// overlay.
    fn overlay_for(param: &str, value: Option<&str>) -> Overlay {
        let params = match value {
            Some(v) => ParamMap::new().with(param, v),
            None => ParamMap::new(),
        };
        rules().evaluate(&params).unwrap()
    }

    fn mapped(param: &str, value: Option<&str>) -> Option<String> {
        overlay_for(param, value).get(param).map(str::to_owned)
    }

    #[test]
    fn test_iteration_is_sorted_by_param() {
        let rules = rules();
        let params: Vec<&str> = rules.iter().map(|(param, _)| param).collect();
        assert_eq!(params, vec!["case", "def", "invar", "max", "multi", "set"]);

        let borrowed: Vec<&String> = (&rules).into_iter().map(|(param, _)| param).collect();
        assert_eq!(borrowed, params);
    }

    #[test]
    fn test_invariant_always_applies() {
        let overlay = overlay_for("set", Some("5"));
        assert_eq!(overlay.get("set"), Some("123"));
        // Unrelated params still get their invariants and defaults
        assert_eq!(overlay.get("multi"), Some("5"));
        assert_eq!(overlay.get("invar"), Some("myinvariant"));
        assert_eq!(mapped("set", None), Some("123".into()));
        assert_eq!(mapped("invar", Some("hello")), Some("myinvariant".into()));
    }

    #[test]
    fn test_threshold() {
        assert_eq!(mapped("max", Some("100")), None);
        assert_eq!(mapped("max", Some("2000")), Some("1000".into()));
        assert_eq!(mapped("max", Some("1000")), Some("1000".into()));
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(mapped("case", None), None);
        assert_eq!(mapped("case", Some("foo")), Some("bar".into()));
        assert_eq!(mapped("case", Some("from")), Some("to".into()));
        assert_eq!(mapped("case", Some("hey")), None);
    }

    #[test]
    fn test_default() {
        assert_eq!(mapped("def", None), Some("mydefault".into()));
        assert_eq!(mapped("def", Some("something")), None);
    }

    #[test]
    fn test_multi() {
        assert_eq!(mapped("multi", None), Some("5".into()));
        assert_eq!(mapped("multi", Some("0")), Some("1".into()));
        assert_eq!(mapped("multi", Some("2")), None);
        assert_eq!(mapped("multi", Some("20")), Some("10".into()));
        assert_eq!(mapped("multi", Some("text")), None);
    }

    #[test]
    fn test_only_fired_rules_in_overlay() {
        let overlay = rules().evaluate(&ParamMap::new()).unwrap();
        let names: Vec<&str> = overlay.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["def", "invar", "multi", "set"]);
    }

    #[test]
    fn test_uses_primary_value() {
        let params = ParamMap::new().with("max", "5000").with("max", "1");
        let overlay = rules().evaluate(&params).unwrap();
        assert_eq!(overlay.get("max"), Some("1000"));
    }

    #[test]
    fn test_invalid_threshold_aborts_evaluation() {
        let rules = RuleSet::parse(["rows=>many:100", "start=0"]).unwrap();
        assert!(rules.evaluate(&ParamMap::new()).is_ok());

        let err = rules
            .evaluate(&ParamMap::new().with("rows", "10"))
            .unwrap_err();
        assert!(err.is_malformed_rule());
    }

    #[test]
    fn test_deterministic() {
        let params = ParamMap::new().with("max", "5000").with("case", "foo");
        let first = rules().evaluate(&params).unwrap();
        let second = rules().evaluate(&params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trace_matches_evaluate() {
        let params = ParamMap::new()
            .with("max", "5000")
            .with("multi", "text")
            .with("case", "hey");
        let rules = rules();
        let trace = rules.evaluate_with_trace(&params).unwrap();
        assert_eq!(trace.overlay, rules.evaluate(&params).unwrap());
        assert_eq!(trace.steps.len(), rules.len());

        let max = trace.step("max").unwrap();
        assert_eq!(max.original.as_deref(), Some("5000"));
        assert_eq!(
            max.outcome,
            Outcome::Matched {
                index: 0,
                condition: ">1000".into(),
                value: "1000".into()
            }
        );

        let multi = trace.step("multi").unwrap();
        assert_eq!(multi.outcome, Outcome::NoMatch);
        assert_eq!(multi.skipped, vec![1]);

        assert_eq!(trace.step("case").unwrap().outcome, Outcome::NoMatch);
        assert_eq!(
            trace.step("def").unwrap().outcome,
            Outcome::Default("mydefault".into())
        );
    }

    #[test]
    fn test_builder() {
        let rules = RuleSet::new().with(
            "rows",
            Rule::new().with(Condition::from_token(">50", "50")),
        );
        let overlay = rules
            .evaluate(&ParamMap::new().with("rows", "51"))
            .unwrap();
        assert_eq!(overlay.get("rows"), Some("50"));
    }

    #[test]
    fn test_rule_set_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleSet>();
    }
}
