//! Lint orchestration
//!
//! Ties the pipeline together: options are preprocessed against the project
//! configuration, files are filtered and grouped by the overrides that apply
//! to them, one engine configuration is built per group, and the engine's
//! reports are merged back in input order.

use crate::config::{
    ConfigBuilder, ConfigLoader, ConfigReader, DiskReader, MergeContext, MergedConfig,
    ModuleResolver, NodeModulesResolver, default_ignores,
};
use crate::discovery::FileFilter;
use crate::engine::{LintEngine, LintReport, merge_reports};
use crate::options::Options;
use crate::overrides::{
    Group, PatternSet, find_applicable_overrides, group_configs, merge_applicable_overrides,
    normalize_path,
};
use crate::{KumiError, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs a [`LintEngine`] over configuration resolved from the project
pub struct Linter<E> {
    engine: E,
    reader: Arc<dyn ConfigReader>,
    resolver: Arc<dyn ModuleResolver>,
}

impl<E: LintEngine> Linter<E> {
    /// Linter reading configuration from disk
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            reader: Arc::new(DiskReader),
            resolver: Arc::new(NodeModulesResolver),
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn ConfigReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn loader(&self) -> ConfigLoader {
        ConfigLoader::new(Arc::clone(&self.reader))
    }

    fn builder(&self, options: &Options) -> ConfigBuilder {
        let cwd = options.cwd.clone().unwrap_or_default();
        ConfigBuilder::new(
            MergeContext::new(cwd)
                .with_reader(Arc::clone(&self.reader))
                .with_resolver(Arc::clone(&self.resolver)),
        )
    }

    /// Lint a piece of source text
    ///
    /// `stdin_filename` stands in for `filename` (and for `cwd`, through its
    /// directory, when no `cwd` is given). Overrides are matched against the
    /// filename relative to `cwd`. Custom `ignores` need a filename to be
    /// checked against; an ignored filename yields an empty one-file report.
    pub fn lint_text(&self, text: &str, options: Options) -> Result<LintReport> {
        let mut options = options;
        if let Some(stdin_filename) = options.stdin_filename.clone() {
            if options.cwd.is_none() {
                options.cwd = parent_dir(&stdin_filename);
            }
            options.filename = Some(stdin_filename);
        }

        let options = self.options_for_file(options)?;
        let config = self.builder(&options).build(&options)?;

        let cwd = options.cwd.clone().unwrap_or_default();
        let filename = options.filename.as_ref().map(|filename| cwd.join(filename));

        if filename.is_none() && config.ignores != default_ignores() {
            return Err(KumiError::config_error(
                "The `ignores` option requires the `filename` option to be defined.",
            ));
        }

        if let Some(filename) = &filename {
            let relative = normalize_path(filename, Some(&cwd));
            if PatternSet::new(&config.ignores)?.is_match(&relative) {
                debug!("Skipping ignored file {}", relative);
                return Ok(LintReport::ignored(relative));
            }
        }

        let report = self
            .engine
            .lint_text(&config, text, filename.as_deref())?;
        Ok(finish(report, &options))
    }

    /// Lint files
    ///
    /// Without an explicit `cwd`, the directory of the first path is used.
    /// Files are filtered by extension and ignore patterns; with overrides
    /// present they are grouped and each group is built and linted on its
    /// own. A group whose build or run fails with a recoverable error is
    /// recorded in [`LintReport::failures`] and the other groups still run.
    pub fn lint_files(&self, paths: &[PathBuf], options: Options) -> Result<LintReport> {
        let mut options = self.loader().preprocess(default_cwd(paths, options))?;
        let paths = FileFilter::from_options(&options)?.filter(&absolute_paths(paths)?);

        let overrides = options.overrides.take().unwrap_or_default();
        if overrides.is_empty() {
            return self.run(&paths, &options);
        }

        let groups = group_configs(&paths, &options, &overrides)?;
        info!("Linting {} files in {} groups", paths.len(), groups.len());

        let reports = groups
            .par_iter()
            .map(|group| match self.run(&group.paths, &group.options) {
                Ok(report) => Ok(report),
                Err(e) if e.is_recoverable() => {
                    warn!("Group {} failed: {}", group.mask, e);
                    Ok(LintReport::failure(group.paths.clone(), e))
                }
                Err(e) => Err(e),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(merge_reports(reports))
    }

    /// Engine configuration that would apply to `filename`
    pub fn config_for_file(&self, filename: &Path, options: Options) -> Result<MergedConfig> {
        let mut options = options;
        options.filename = Some(filename.to_path_buf());
        let options = self.options_for_file(options)?;
        self.builder(&options).build(&options)
    }

    /// Override groups for `paths`, after filtering
    ///
    /// `cwd` defaults the same way as for [`lint_files`](Self::lint_files).
    pub fn groups(&self, paths: &[PathBuf], options: Options) -> Result<Vec<Group>> {
        let mut options = self.loader().preprocess(default_cwd(paths, options))?;
        let paths = FileFilter::from_options(&options)?.filter(&absolute_paths(paths)?);
        let overrides = options.overrides.take().unwrap_or_default();
        group_configs(&paths, &options, &overrides)
    }

    /// Preprocess and fold in the overrides that apply to `filename`
    fn options_for_file(&self, options: Options) -> Result<Options> {
        let mut options = self.loader().preprocess(options)?;
        let overrides = options.overrides.take().unwrap_or_default();
        if overrides.is_empty() {
            return Ok(options);
        }

        let Some(filename) = options.filename.clone() else {
            debug!("No filename given, skipping {} overrides", overrides.len());
            return Ok(options);
        };

        let cwd = options.cwd.clone().unwrap_or_default();
        let relative = normalize_path(&cwd.join(filename), Some(&cwd));
        let found = find_applicable_overrides(&relative, &overrides)?;
        debug!("{} matches overrides {}", relative, found.mask);
        Ok(merge_applicable_overrides(&options, &found.applicable))
    }

    fn run(&self, paths: &[PathBuf], options: &Options) -> Result<LintReport> {
        if paths.is_empty() {
            return Ok(LintReport::default());
        }
        let config = self.builder(options).build(options)?;
        let report = self.engine.lint_files(&config, paths)?;
        Ok(finish(report, options))
    }
}

/// Apply `quiet` to an engine report
fn finish(report: LintReport, options: &Options) -> LintReport {
    if options.quiet == Some(true) {
        report.retain_errors()
    } else {
        report
    }
}

/// Directory of `path`, `None` for a bare file name
fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Fill a missing `cwd` from the first path's directory
fn default_cwd(paths: &[PathBuf], mut options: Options) -> Options {
    if options.cwd.is_none() {
        options.cwd = paths.first().and_then(|path| parent_dir(path));
    }
    options
}

fn absolute_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|path| std::path::absolute(path).map_err(|e| KumiError::io_error(path, e)))
        .collect()
}
