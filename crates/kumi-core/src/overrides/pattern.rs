//! Ordered glob pattern sets
//!
//! A pattern set is evaluated front to back and the last pattern that
//! matches decides: a positive pattern includes, a `!`-prefixed pattern
//! excludes. A later positive pattern can re-include what an earlier
//! negation removed. Brace alternation (`*.{js,jsx}`) is expanded before
//! compiling since `glob` patterns do not support it.

use crate::{KumiError, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct CompiledPattern {
    negated: bool,
    alternatives: Vec<Pattern>,
}

impl CompiledPattern {
    fn matches(&self, path: &str) -> bool {
        self.alternatives
            .iter()
            .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }
}

/// Compiled, ordered set of glob patterns
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compile patterns in order
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| compile(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether the set has no patterns (and therefore never matches)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Evaluate the set against a normalized (forward-slash, relative) path
    pub fn is_match(&self, path: &str) -> bool {
        let mut included = false;
        for pattern in &self.patterns {
            if pattern.matches(path) {
                included = !pattern.negated;
            }
        }
        included
    }

    /// Normalize `path` against `base` and evaluate the set
    pub fn is_match_path(&self, path: &Path, base: Option<&Path>) -> bool {
        self.is_match(&normalize_path(path, base))
    }
}

fn compile(raw: &str) -> Result<CompiledPattern> {
    let bangs = raw.chars().take_while(|c| *c == '!').count();
    let body = &raw[bangs..];
    let alternatives = expand_braces(body)
        .iter()
        .map(|expanded| {
            Pattern::new(expanded).map_err(|e| KumiError::invalid_pattern(raw, e.msg))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledPattern {
        negated: bangs % 2 == 1,
        alternatives,
    })
}

/// Convert a path to the form patterns are matched against
///
/// The path is made relative to `base` when it lies under it, separators
/// become `/`, and leading `./` or `/` is dropped.
pub fn normalize_path(path: &Path, base: Option<&Path>) -> String {
    let relative = base
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);
    let slashed = relative.to_string_lossy().replace('\\', "/");
    let mut trimmed = slashed.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Expand `{a,b}` alternation, nested groups included
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let mut depth = 0usize;
    let mut open = None;

    for (index, c) in pattern.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(index);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    continue;
                }
                let Some(start) = open.take() else {
                    continue;
                };
                let branches = split_top_level(&pattern[start + 1..index]);
                if branches.len() < 2 {
                    continue;
                }
                let prefix = &pattern[..start];
                let suffix = &pattern[index + 1..];
                return branches
                    .iter()
                    .flat_map(|branch| expand_braces(&format!("{prefix}{branch}{suffix}")))
                    .collect();
            }
            _ => {}
        }
    }

    vec![pattern.to_string()]
}

fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (index, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[last..index]);
                last = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[last..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("{tmp,temp}/**"), vec!["tmp/**", "temp/**"]);
        assert_eq!(
            expand_braces("fixture{-*,}.{js,jsx}"),
            vec!["fixture-*.js", "fixture-*.jsx", "fixture.js", "fixture.jsx"]
        );
        assert_eq!(
            expand_braces("{test,tests}/fixture{s,}/**"),
            vec![
                "test/fixtures/**",
                "test/fixture/**",
                "tests/fixtures/**",
                "tests/fixture/**"
            ]
        );
        assert_eq!(expand_braces("plain/*.js"), vec!["plain/*.js"]);
        assert_eq!(expand_braces("{single}.js"), vec!["{single}.js"]);
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(expand_braces("a{b,c{d,e}}"), vec!["ab", "acd", "ace"]);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/user/dir/foo.js"), None), "user/dir/foo.js");
        assert_eq!(
            normalize_path(Path::new("/project/src/a.js"), Some(Path::new("/project"))),
            "src/a.js"
        );
        assert_eq!(normalize_path(Path::new("./src/a.js"), None), "src/a.js");
        assert_eq!(
            normalize_path(Path::new("other/a.js"), Some(Path::new("/project"))),
            "other/a.js"
        );
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let set = PatternSet::new(&["*.js"]).unwrap();
        assert!(set.is_match("foo.js"));
        assert!(!set.is_match("dir/foo.js"));
    }

    #[test]
    fn test_globstar_spans_directories() {
        let set = PatternSet::new(&["**/foo/*"]).unwrap();
        assert!(set.is_match("user/foo/hello.js"));
        assert!(set.is_match("foo/hello.js"));
        assert!(!set.is_match("user/bar/hello.js"));
    }

    #[test]
    fn test_last_matching_pattern_wins() {
        let set = PatternSet::new(&["**/*.js", "!**/vendor/**", "**/vendor/keep.js"]).unwrap();
        assert!(set.is_match("src/a.js"));
        assert!(!set.is_match("src/vendor/lib.js"));
        assert!(set.is_match("src/vendor/keep.js"));
    }

    #[test]
    fn test_double_negation_is_positive() {
        let set = PatternSet::new(&["!!*.js"]).unwrap();
        assert!(set.is_match("a.js"));
    }

    #[test]
    fn test_leading_negation_alone_matches_nothing() {
        let set = PatternSet::new(&["!*.js"]).unwrap();
        assert!(!set.is_match("a.js"));
        assert!(!set.is_match("a.ts"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = PatternSet::new::<&str>(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.is_match("anything.js"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternSet::new(&["src/[.js"]).unwrap_err();
        assert!(err.to_string().contains("src/[.js"));
    }
}
