//! reqsan-test: Conformance fixtures for reqsan
//!
//! YAML fixtures describe a rule set plus request cases and the overlay each
//! case must produce. The runner lives behind the `fixtures` feature.
//!
//! # Example
//!
//! ```
//! use reqsan_test::prelude::*;
//!
//! let params = request(&[("rows", "5000"), ("q", "rust")]);
//! let overlay = sanitize(["rows=>100:100"], &params).unwrap();
//! assert_eq!(overlay.get("rows"), Some("100"));
//! ```

use reqsan::ParamMap;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Build request parameters from `(name, value)` pairs.
///
/// Repeated names become multi-valued parameters.
#[must_use]
pub fn request(pairs: &[(&str, &str)]) -> ParamMap {
    pairs.iter().copied().collect()
}

/// Load every fixture document in `dir` (`.yaml` / `.yml`, `---` separated),
/// sorted by file name.
///
/// # Errors
///
/// Returns a message naming the file that failed to read or parse.
#[cfg(feature = "fixtures")]
pub fn load_fixtures(dir: &std::path::Path) -> Result<Vec<fixture::Fixture>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("failed to read \"{}\": {e}", dir.display()))?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();

    let mut fixtures = Vec::new();
    for path in paths {
        let yaml = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read \"{}\": {e}", path.display()))?;
        let docs = fixture::Fixture::from_yaml_multi(&yaml)
            .map_err(|e| format!("failed to parse \"{}\": {e}", path.display()))?;
        fixtures.extend(docs);
    }
    Ok(fixtures)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::request;
    pub use reqsan::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqsan::ParamSource;

    #[test]
    fn test_request_builder() {
        let params = request(&[("fq", "a"), ("q", "x"), ("fq", "b")]);
        assert_eq!(params.get("q"), Some("x"));
        assert_eq!(params.get_all("fq").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_full_pipeline() {
        let params = request(&[("sanitize", "rows=>100:100"), ("rows", "500")]);
        let prepared = reqsan::RequestSanitizer::default()
            .prepare(&params)
            .unwrap();
        assert_eq!(prepared.params().get("rows"), Some("100"));
    }
}

#[cfg(all(test, feature = "fixtures"))]
mod fixture_tests {
    use super::fixture::Fixture;

    #[test]
    fn run_inline_fixture() {
        let yaml = r#"
name: inline
rules:
  - case=foo:bar from:to
cases:
  - name: hit
    params: { case: foo }
    expect: { case: bar }
    effective: { case: bar }
  - name: miss
    params: { case: hey }
    expect: {}
    effective: { case: hey }
  - name: absent
    expect: {}
    effective: { case: null }
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }

    #[test]
    fn failing_case_is_reported() {
        let yaml = r#"
name: wrong
rules: ["rows=10"]
cases:
  - name: expects_nothing
    params: { rows: "5" }
    expect: {}
"#;
        let results = Fixture::from_yaml(yaml).unwrap().run();
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }

    #[test]
    fn parse_error_fixture() {
        let yaml = r#"
name: broken
rules: ["rows"]
expect_parse_error: true
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}
