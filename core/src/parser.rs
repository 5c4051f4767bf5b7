//! Rule parser — raw `param=body` strings into a [`RuleSet`]
//!
//! Grammar (one rule per string):
//!
//! ```text
//! rule   := param "=" body
//! body   := value                      ; no ':' anywhere → invariant shorthand
//!         | token (" " token)*
//! token  := key ":" value
//! ```
//!
//! Replacement values cannot contain `:` or a space; there is no escaping.

use crate::condition::Condition;
use crate::{Rule, RuleSet, SanitizeError};

/// Parse raw rule strings into a [`RuleSet`].
///
/// Parsing is all-or-nothing: the first malformed string aborts with an error
/// and no partial rule set is returned. A parameter defined more than once
/// keeps its last definition.
///
/// # Errors
///
/// - [`SanitizeError::MissingSeparator`] if a string has no `=`
/// - [`SanitizeError::MalformedCondition`] if a token is not exactly `key:value`
///
/// # Example
///
/// ```
/// use reqsan::parse_rules;
///
/// let rules = parse_rules(["rows=>100:100", "debugQuery=default:false"]).unwrap();
/// assert_eq!(rules.len(), 2);
/// assert!(parse_rules(["rows"]).is_err());
/// ```
pub fn parse_rules<I, S>(raw: I) -> Result<RuleSet, SanitizeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rules = RuleSet::new();
    for line in raw {
        let (param, rule) = parse_rule(line.as_ref())?;
        rules.insert(param, rule);
    }
    Ok(rules)
}

/// Parse a single `param=body` string.
///
/// # Errors
///
/// See [`parse_rules`].
pub fn parse_rule(line: &str) -> Result<(String, Rule), SanitizeError> {
    let Some((param, body)) = line.split_once('=') else {
        tracing::warn!(rule = line, "rule has no parameter separator");
        return Err(SanitizeError::MissingSeparator {
            rule: line.to_owned(),
        });
    };
    Ok((param.to_owned(), parse_body(param, body)?))
}

/// Parse the body of a rule for `param`.
///
/// # Errors
///
/// Returns [`SanitizeError::MalformedCondition`] for a token that does not
/// split into a key and a non-empty value.
pub fn parse_body(param: &str, body: &str) -> Result<Rule, SanitizeError> {
    if !body.contains(':') {
        return Ok(Rule::invariant(body));
    }

    // Trailing empty tokens are dropped, any other empty token is malformed.
    body.trim_end_matches(' ')
        .split(' ')
        .map(|token| parse_token(param, token))
        .collect()
}

fn parse_token(param: &str, token: &str) -> Result<Condition, SanitizeError> {
    let mut parts = token.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !value.is_empty() => {
            Ok(Condition::from_token(key, value))
        }
        _ => {
            tracing::warn!(param, token, "malformed rule token");
            Err(SanitizeError::MalformedCondition {
                param: param.to_owned(),
                token: token.to_owned(),
            })
        }
    }
}
