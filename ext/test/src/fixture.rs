//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the reqsan engine.
//!
//! ```yaml
//! name: threshold_caps
//! description: ">N caps a numeric value, inclusive at the boundary"
//! rules:
//!   - max=>1000:1000
//! cases:
//!   - name: above
//!     params: { max: "2000" }
//!     expect: { max: "1000" }
//!   - name: below
//!     params: { max: "100" }
//!     expect: {}
//! ```

use reqsan::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw rule strings, parsed as one rule set.
    pub rules: Vec<String>,
    /// The rule set itself must fail to parse.
    #[serde(default)]
    pub expect_parse_error: bool,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// One or many values for a request parameter
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ParamValues {
    One(String),
    Many(Vec<String>),
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValues>,
    /// Exact expected overlay. Ignored when `expect_error` is set.
    #[serde(default)]
    pub expect: BTreeMap<String, String>,
    /// Expected primary values of the merged view (`null` = absent).
    #[serde(default)]
    pub effective: BTreeMap<String, Option<String>>,
    /// Evaluation must fail with a malformed-rule error.
    #[serde(default)]
    pub expect_error: bool,
}

impl TestCase {
    /// Build the original request parameters for this case
    pub fn build_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        for (name, values) in &self.params {
            match values {
                ParamValues::One(v) => params.insert(name.clone(), v.clone()),
                ParamValues::Many(vs) => {
                    for v in vs {
                        params.insert(name.clone(), v.clone());
                    }
                }
            }
        }
        params
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Vec<CaseResult> {
        let rules = match RuleSet::parse(&self.rules) {
            Ok(rules) if !self.expect_parse_error => rules,
            Ok(rules) => {
                return vec![CaseResult {
                    case_name: "<parse>".into(),
                    passed: false,
                    expected: "parse error".into(),
                    actual: format!("{} rules", rules.len()),
                }]
            }
            Err(e) => {
                return vec![CaseResult {
                    case_name: "<parse>".into(),
                    passed: self.expect_parse_error && e.is_malformed_rule(),
                    expected: if self.expect_parse_error {
                        "parse error".into()
                    } else {
                        "rules".into()
                    },
                    actual: e.to_string(),
                }]
            }
        };

        self.cases
            .iter()
            .map(|case| run_case(&rules, case))
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

fn run_case(rules: &RuleSet, case: &TestCase) -> CaseResult {
    let original = case.build_params();

    let overlay = match rules.evaluate(&original) {
        Ok(overlay) => overlay,
        Err(e) => {
            return CaseResult {
                case_name: case.name.clone(),
                passed: case.expect_error && e.is_malformed_rule(),
                expected: if case.expect_error {
                    "error".into()
                } else {
                    format!("{:?}", case.expect)
                },
                actual: e.to_string(),
            }
        }
    };

    if case.expect_error {
        return CaseResult {
            case_name: case.name.clone(),
            passed: false,
            expected: "error".into(),
            actual: overlay.to_string(),
        };
    }

    let actual: BTreeMap<String, String> = overlay
        .iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

    let view = merge(overlay, &original);
    let effective_ok = case
        .effective
        .iter()
        .all(|(name, expected)| view.get(name) == expected.as_deref());

    CaseResult {
        case_name: case.name.clone(),
        passed: actual == case.expect && effective_ok,
        expected: format!("{:?} effective {:?}", case.expect, case.effective),
        actual: format!("{actual:?} names {:?}", view.names()),
    }
}
