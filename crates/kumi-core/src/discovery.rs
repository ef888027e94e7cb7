//! File selection for lint runs
//!
//! Paths handed to [`crate::Linter::lint_files`] are narrowed to the
//! configured extensions and stripped of anything an ignore pattern matches.
//! Globbing and `.gitignore` handling are left to the caller.

use crate::Result;
use crate::options::Options;
use crate::overrides::PatternSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension and ignore-pattern filter rooted at a working directory
#[derive(Debug, Clone)]
pub struct FileFilter {
    root_dir: PathBuf,
    extensions: Vec<String>,
    ignores: PatternSet,
}

impl FileFilter {
    pub fn new(
        root_dir: impl Into<PathBuf>,
        extensions: &[String],
        ignores: &[String],
    ) -> Result<Self> {
        Ok(Self {
            root_dir: root_dir.into(),
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
            ignores: PatternSet::new(ignores)?,
        })
    }

    /// Filter built from preprocessed options
    pub fn from_options(options: &Options) -> Result<Self> {
        Self::new(
            options.cwd.clone().unwrap_or_default(),
            options.extensions.as_deref().unwrap_or_default(),
            options.ignores.as_deref().unwrap_or_default(),
        )
    }

    /// Whether the file's extension is one of the configured ones
    pub fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Whether any ignore pattern matches the path relative to the root
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignores.is_match_path(path, Some(&self.root_dir))
    }

    pub fn should_include(&self, path: &Path) -> bool {
        self.has_extension(path) && !self.is_ignored(path)
    }

    /// Keep included paths, preserving order
    pub fn filter(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let kept: Vec<PathBuf> = paths
            .iter()
            .filter(|path| self.should_include(path))
            .cloned()
            .collect();
        debug!("Kept {} of {} paths", kept.len(), paths.len());
        kept
    }
}
