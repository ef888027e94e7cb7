//! Boundary to the lint-execution engine
//!
//! kumi never runs rules itself. An engine receives a [`MergedConfig`] and
//! either file paths or source text, and answers with a [`LintReport`].

use crate::Result;
use crate::config::MergedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Executes lint rules for a built configuration
pub trait LintEngine: Send + Sync {
    /// Lint files on disk
    fn lint_files(&self, config: &MergedConfig, paths: &[PathBuf]) -> Result<LintReport>;

    /// Lint source text, optionally attributed to `filename`
    fn lint_text(
        &self,
        config: &MergedConfig,
        text: &str,
        filename: Option<&Path>,
    ) -> Result<LintReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single diagnostic reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl LintMessage {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: None,
            severity,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Diagnostics for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_path: PathBuf,
    pub messages: Vec<LintMessage>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl FileResult {
    /// Result with counts derived from `messages`
    pub fn new(file_path: impl Into<PathBuf>, messages: Vec<LintMessage>) -> Self {
        let error_count = messages.iter().filter(|m| m.is_error()).count();
        Self {
            file_path: file_path.into(),
            warning_count: messages.len() - error_count,
            error_count,
            messages,
        }
    }

    /// Result for a file with no diagnostics
    pub fn clean(file_path: impl Into<PathBuf>) -> Self {
        Self::new(file_path, Vec::new())
    }
}

/// Files of a group whose config build or engine run failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFailure {
    pub paths: Vec<PathBuf>,
    pub error: String,
}

/// Aggregated engine output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub results: Vec<FileResult>,
    pub error_count: usize,
    pub warning_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<GroupFailure>,
}

impl LintReport {
    /// Report with counts summed from `results`
    pub fn from_results(results: Vec<FileResult>) -> Self {
        Self {
            error_count: results.iter().map(|r| r.error_count).sum(),
            warning_count: results.iter().map(|r| r.warning_count).sum(),
            results,
            failures: Vec::new(),
        }
    }

    /// Report for a single file that was skipped
    pub fn ignored(file_path: impl Into<PathBuf>) -> Self {
        Self::from_results(vec![FileResult::clean(file_path)])
    }

    pub fn failure(paths: Vec<PathBuf>, error: impl ToString) -> Self {
        Self {
            failures: vec![GroupFailure {
                paths,
                error: error.to_string(),
            }],
            ..Default::default()
        }
    }

    /// Keep error messages only, dropping files left without any
    pub fn retain_errors(mut self) -> Self {
        self.results = error_results(&self.results);
        self.warning_count = 0;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0 || !self.failures.is_empty()
    }
}

/// Concatenate reports in order, summing their counts
pub fn merge_reports(reports: impl IntoIterator<Item = LintReport>) -> LintReport {
    let mut merged = LintReport::default();
    for report in reports {
        merged.error_count += report.error_count;
        merged.warning_count += report.warning_count;
        merged.results.extend(report.results);
        merged.failures.extend(report.failures);
    }
    merged
}

/// Per-file results reduced to error messages; files without errors are dropped
pub fn error_results(results: &[FileResult]) -> Vec<FileResult> {
    results
        .iter()
        .filter(|result| result.error_count > 0)
        .map(|result| FileResult {
            file_path: result.file_path.clone(),
            messages: result
                .messages
                .iter()
                .filter(|m| m.is_error())
                .cloned()
                .collect(),
            error_count: result.error_count,
            warning_count: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str) -> FileResult {
        FileResult::new(
            path,
            vec![
                LintMessage::new(Severity::Error, "Missing semicolon.")
                    .with_rule("semi")
                    .at(1, 10),
                LintMessage::new(Severity::Warning, "Unexpected console statement.")
                    .with_rule("no-console"),
            ],
        )
    }

    #[test]
    fn test_file_result_counts() {
        let result = sample("a.js");
        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
    }

    #[test]
    fn test_merge_reports() {
        let merged = merge_reports(vec![
            LintReport::from_results(vec![sample("a.js")]),
            LintReport::from_results(vec![sample("b.js"), FileResult::clean("c.js")]),
            LintReport::failure(vec!["d.js".into()], "boom"),
        ]);

        assert_eq!(merged.error_count, 2);
        assert_eq!(merged.warning_count, 2);
        let paths: Vec<_> = merged.results.iter().map(|r| r.file_path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.js"), "b.js".into(), "c.js".into()]);
        assert_eq!(merged.failures.len(), 1);
        assert!(merged.has_errors());
    }

    #[test]
    fn test_error_results() {
        let results = vec![sample("a.js"), FileResult::clean("b.js")];
        let errors = error_results(&results);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].messages.len(), 1);
        assert_eq!(errors[0].messages[0].rule_id.as_deref(), Some("semi"));
        assert_eq!(errors[0].warning_count, 0);
    }

    #[test]
    fn test_ignored_report() {
        let report = LintReport::ignored("vendor/lib.js");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.error_count, 0);
        assert!(report.results[0].messages.is_empty());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let value = serde_json::to_value(LintReport::from_results(vec![sample("a.js")])).unwrap();
        assert_eq!(value["errorCount"], 1);
        assert_eq!(value["results"][0]["messages"][0]["ruleId"], "semi");
        assert_eq!(value["results"][0]["messages"][0]["severity"], "error");
        assert!(value.get("failures").is_none());
    }
}
