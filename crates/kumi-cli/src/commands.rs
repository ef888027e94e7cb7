//! CLI command implementations
//!
//! The commands only inspect configuration; no lint engine is wired in, so
//! every command goes through a [`Linter`] whose engine refuses to run.

use anyhow::{Context, Result};
use kumi_core::{
    KumiError, LintEngine, LintReport, Linter, MergedConfig, Options, normalize_options,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::OutputFormat;
use crate::output::{GroupsFormatter, print_json};

/// Engine slot for commands that never lint
struct InspectOnly;

impl LintEngine for InspectOnly {
    fn lint_files(
        &self,
        _config: &MergedConfig,
        _paths: &[PathBuf],
    ) -> kumi_core::Result<LintReport> {
        Err(KumiError::engine_error("no lint engine is configured"))
    }

    fn lint_text(
        &self,
        _config: &MergedConfig,
        _text: &str,
        _filename: Option<&Path>,
    ) -> kumi_core::Result<LintReport> {
        Err(KumiError::engine_error("no lint engine is configured"))
    }
}

/// Caller options from `--cwd` and `--options`
fn caller_options(cwd: Option<PathBuf>, raw: Option<&str>) -> Result<Options> {
    let mut options = match raw {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--options must be valid JSON")?;
            normalize_options(&value)?
        }
        None => Options::default(),
    };
    if cwd.is_some() {
        options.cwd = cwd;
    }
    Ok(options)
}

/// Print the merged configuration for one file
pub fn print_config_command(cwd: Option<PathBuf>, file: PathBuf, raw: Option<&str>) -> Result<()> {
    let options = caller_options(cwd, raw)?;
    debug!("Resolving configuration for {}", file.display());

    let config = Linter::new(InspectOnly)
        .config_for_file(&file, options)
        .with_context(|| format!("failed to resolve configuration for {}", file.display()))?;

    print_json(&config)
}

/// Print files grouped by the overrides they match
pub fn groups_command(
    cwd: Option<PathBuf>,
    paths: Vec<PathBuf>,
    format: OutputFormat,
    raw: Option<&str>,
    use_colors: bool,
) -> Result<()> {
    let options = caller_options(cwd, raw)?;
    let root = match &options.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().context("failed to read the working directory")?,
    };

    let groups = Linter::new(InspectOnly)
        .groups(&paths, options)
        .context("failed to group files")?;

    match format {
        OutputFormat::Json => print_json(&groups),
        OutputFormat::Human => {
            GroupsFormatter::new(root, use_colors).print(&groups);
            Ok(())
        }
    }
}
