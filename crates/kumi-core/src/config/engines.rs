//! Runtime-version gated rules
//!
//! A project that declares `engines.node` gets rules enabled once the
//! lowest Node.js version the range admits reaches the rule's threshold.
//! Ranges must spell out an operator for every comparator (`>=6`, `^8.1`);
//! a bare `4` is rejected and enables nothing.

use crate::options::{Engines, RuleMap};
use semver::{Comparator, Op, Version, VersionReq};
use serde_json::{Value, json};
use tracing::debug;

const OPERATORS: &[&str] = &[">=", "<=", ">", "<", "=", "~", "^"];
const WILDCARDS: &[&str] = &["*", "x", "X"];

/// A rule switched on from a minimum runtime version
#[derive(Debug, Clone, PartialEq)]
pub struct GatedRule {
    pub rule: &'static str,
    pub since: Version,
    pub value: Value,
}

/// Gated rules in ascending threshold order
pub fn gated_rules() -> Vec<GatedRule> {
    vec![
        GatedRule {
            rule: "unicorn/prefer-spread",
            since: Version::new(5, 0, 0),
            value: json!("error"),
        },
        GatedRule {
            rule: "prefer-rest-params",
            since: Version::new(6, 0, 0),
            value: json!("error"),
        },
        GatedRule {
            rule: "prefer-destructuring",
            since: Version::new(6, 0, 0),
            value: json!(["error", {"array": true, "object": true}]),
        },
        GatedRule {
            rule: "promise/prefer-await-to-then",
            since: Version::new(8, 0, 0),
            value: json!("error"),
        },
    ]
}

/// Rules enabled by the declared engines
///
/// Absent engines, `engines: false`, a missing `node` entry and unparseable
/// ranges all yield an empty map.
pub fn engine_rules(engines: Option<&Engines>) -> RuleMap {
    let Some(range) = engines.and_then(Engines::node) else {
        return RuleMap::new();
    };
    let Some(floor) = lower_bound(range) else {
        debug!("Ignoring invalid node range `{}`", range);
        return RuleMap::new();
    };

    gated_rules()
        .into_iter()
        .filter(|gate| floor >= gate.since)
        .map(|gate| (gate.rule.to_string(), gate.value))
        .collect()
}

/// Lowest version a node-style range admits, `None` for invalid ranges
///
/// Comparators separated by whitespace intersect; `||` alternatives union,
/// so the result is the minimum over alternatives of each alternative's
/// highest floor.
pub fn lower_bound(range: &str) -> Option<Version> {
    range
        .split("||")
        .map(alternative_floor)
        .collect::<Option<Vec<_>>>()?
        .into_iter()
        .min()
}

fn alternative_floor(alternative: &str) -> Option<Version> {
    let comparators = comparators(alternative)?;
    if comparators.iter().any(|c| WILDCARDS.contains(&c.as_str())) {
        return if comparators.len() == 1 {
            Some(Version::new(0, 0, 0))
        } else {
            None
        };
    }

    let req = VersionReq::parse(&comparators.join(", ")).ok()?;
    req.comparators
        .iter()
        .map(comparator_floor)
        .max()
        .or(Some(Version::new(0, 0, 0)))
}

/// Split an alternative into comparators, each carrying its operator
fn comparators(alternative: &str) -> Option<Vec<String>> {
    let tokens: Vec<&str> = alternative.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    // `1.2.3 - 2.3.4`
    if let [from, "-", to] = tokens.as_slice() {
        return Some(vec![format!(">={from}"), format!("<={to}")]);
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut pending: Option<&str> = None;
    for token in tokens {
        let joined = match pending.take() {
            Some(op) => format!("{op}{token}"),
            None if OPERATORS.contains(&token) => {
                pending = Some(token);
                continue;
            }
            None => token.to_string(),
        };
        let has_operator = OPERATORS.iter().any(|op| joined.starts_with(op));
        if !has_operator && !WILDCARDS.contains(&joined.as_str()) {
            return None;
        }
        out.push(joined);
    }

    if pending.is_some() { None } else { Some(out) }
}

fn comparator_floor(comparator: &Comparator) -> Version {
    let minor = comparator.minor.unwrap_or(0);
    let patch = comparator.patch.unwrap_or(0);
    match comparator.op {
        Op::Greater => match (comparator.minor, comparator.patch) {
            (Some(minor), Some(patch)) => Version::new(comparator.major, minor, patch + 1),
            (Some(minor), None) => Version::new(comparator.major, minor + 1, 0),
            _ => Version::new(comparator.major + 1, 0, 0),
        },
        Op::Less | Op::LessEq => Version::new(0, 0, 0),
        _ => Version::new(comparator.major, minor, patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn node(range: &str) -> Engines {
        Engines::Constraints(IndexMap::from([("node".to_string(), range.to_string())]))
    }

    fn rule_names(rules: &RuleMap) -> Vec<&str> {
        rules.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_lower_bound() {
        assert_eq!(lower_bound(">=8"), Some(Version::new(8, 0, 0)));
        assert_eq!(lower_bound(">=5.1"), Some(Version::new(5, 1, 0)));
        assert_eq!(lower_bound(">=6 <10"), Some(Version::new(6, 0, 0)));
        assert_eq!(lower_bound("^8.9.0"), Some(Version::new(8, 9, 0)));
        assert_eq!(lower_bound("~6.2"), Some(Version::new(6, 2, 0)));
        assert_eq!(lower_bound(">= 6"), Some(Version::new(6, 0, 0)));
        assert_eq!(lower_bound(">5"), Some(Version::new(6, 0, 0)));
        assert_eq!(lower_bound(">5.1.2"), Some(Version::new(5, 1, 3)));
        assert_eq!(lower_bound("<10"), Some(Version::new(0, 0, 0)));
        assert_eq!(lower_bound("*"), Some(Version::new(0, 0, 0)));
        assert_eq!(lower_bound("6.0.0 - 8.0.0"), Some(Version::new(6, 0, 0)));
    }

    #[test]
    fn test_alternatives_take_the_minimum() {
        assert_eq!(lower_bound(">=8 || >=6"), Some(Version::new(6, 0, 0)));
        assert_eq!(lower_bound("^4 || ^6 || ^8"), Some(Version::new(4, 0, 0)));
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(lower_bound("4"), None);
        assert_eq!(lower_bound("4.2.1"), None);
        assert_eq!(lower_bound(""), None);
        assert_eq!(lower_bound(">="), None);
        assert_eq!(lower_bound(">=banana"), None);
        assert_eq!(lower_bound(">=6 || 4"), None);
    }

    #[test]
    fn test_engines_absent_or_false() {
        assert!(engine_rules(None).is_empty());
        assert!(engine_rules(Some(&Engines::Enabled(false))).is_empty());
        assert!(engine_rules(Some(&Engines::empty())).is_empty());
    }

    #[test]
    fn test_engines_invalid_range() {
        assert!(engine_rules(Some(&node("4"))).is_empty());
    }

    #[test]
    fn test_engines_thresholds() {
        assert!(engine_rules(Some(&node(">=4"))).is_empty());

        let rules = engine_rules(Some(&node(">=5.1")));
        assert_eq!(rule_names(&rules), vec!["unicorn/prefer-spread"]);

        let rules = engine_rules(Some(&node(">=6")));
        assert_eq!(
            rule_names(&rules),
            vec!["unicorn/prefer-spread", "prefer-rest-params", "prefer-destructuring"]
        );
        assert_eq!(
            rules["prefer-destructuring"],
            json!(["error", {"array": true, "object": true}])
        );

        let rules = engine_rules(Some(&node(">=8")));
        assert_eq!(rules.len(), 4);
        assert_eq!(rules["promise/prefer-await-to-then"], json!("error"));
    }
}
