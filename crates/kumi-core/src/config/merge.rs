//! Configuration merging logic
//!
//! [`ConfigBuilder::build`] turns fully-merged [`Options`] into the
//! [`MergedConfig`] handed to the lint engine. Each stage takes the config
//! built so far and returns the next one; nothing outside the
//! [`MergeContext`] is consulted.

use super::engines::engine_rules;
use super::formatter::{find_formatter_config, formatter_options};
use super::presets::{PRETTIER_PRESET, base_presets};
use super::reader::{ConfigReader, DiskReader};
use super::resolve::{ModuleResolver, NodeModulesResolver, shareable_config_name};
use crate::options::{Options, RuleMap, SettingsMap};
use crate::{KumiError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const REACT_PLUGIN_PACKAGE: &str = "eslint-plugin-react";

/// Final configuration consumed by the lint engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedConfig {
    /// Presets and shareable configs, later entries win
    pub extends: Vec<String>,
    pub plugins: Vec<String>,
    pub rules: RuleMap,
    pub settings: SettingsMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    pub envs: Vec<String>,
    pub globals: Vec<String>,
    pub ignores: Vec<String>,
    pub extensions: Vec<String>,
    pub cache_location: PathBuf,
    pub fix: bool,
}

/// Everything a build may consult besides the options themselves
#[derive(Clone)]
pub struct MergeContext {
    cwd: PathBuf,
    resolver: Arc<dyn ModuleResolver>,
    reader: Arc<dyn ConfigReader>,
}

impl std::fmt::Debug for MergeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeContext")
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl MergeContext {
    /// Context resolving modules from `node_modules` and reading from disk
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            resolver: Arc::new(NodeModulesResolver),
            reader: Arc::new(DiskReader),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn ConfigReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Working directory for a build: the options' `cwd` when set
    fn cwd_for<'a>(&'a self, options: &'a Options) -> &'a Path {
        options.cwd.as_deref().unwrap_or(&self.cwd)
    }
}

/// Builds [`MergedConfig`]s from options
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    context: MergeContext,
}

impl ConfigBuilder {
    pub fn new(context: MergeContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &MergeContext {
        &self.context
    }

    /// Build the engine configuration for `options`
    ///
    /// The same options always produce the same config, and feeding the
    /// resulting rules, settings and parser back in reproduces it.
    pub fn build(&self, options: &Options) -> Result<MergedConfig> {
        let cwd = self.context.cwd_for(options);

        let config = base_config(options, cwd);
        let config = with_indent(config, options, cwd, self.context.resolver.as_ref());
        let config = with_semicolon(config, options);
        let config = with_formatter(config, options, cwd, self.context.reader.as_ref())?;
        let config = with_engine_rules(config, options);
        let config = with_extends(config, options, cwd, &self.context)?;
        let config = with_explicit_options(config, options);

        debug!(
            "Built config with {} extends, {} plugins, {} rules",
            config.extends.len(),
            config.plugins.len(),
            config.rules.len()
        );
        Ok(config)
    }
}

fn base_config(options: &Options, cwd: &Path) -> MergedConfig {
    MergedConfig {
        extends: base_presets(options.esnext_enabled())
            .iter()
            .map(|preset| preset.to_string())
            .collect(),
        envs: options.envs.clone().unwrap_or_default(),
        globals: options.globals.clone().unwrap_or_default(),
        ignores: options.ignores.clone().unwrap_or_default(),
        extensions: options.extensions.clone().unwrap_or_default(),
        cache_location: cwd.join("node_modules").join(".cache").join("kumi"),
        fix: options.fix == Some(true),
        ..Default::default()
    }
}

fn with_indent(
    mut config: MergedConfig,
    options: &Options,
    cwd: &Path,
    resolver: &dyn ModuleResolver,
) -> MergedConfig {
    // Tabs are the base presets' own indentation
    let Some(width) = options.space_width().filter(|_| !options.prettier_enabled()) else {
        return config;
    };
    config.rules.insert(
        "indent".to_string(),
        json!(["error", width, {"SwitchCase": 1}]),
    );

    if resolver.resolve(REACT_PLUGIN_PACKAGE, cwd).is_some() {
        config.plugins.push("react".to_string());
        config
            .rules
            .insert("react/jsx-indent".to_string(), json!(["error", width]));
        config
            .rules
            .insert("react/jsx-indent-props".to_string(), json!(["error", width]));
    }

    config
}

fn with_semicolon(mut config: MergedConfig, options: &Options) -> MergedConfig {
    if options.prettier_enabled() {
        return config;
    }

    if options.semicolon_required() {
        config
            .rules
            .insert("semi".to_string(), json!(["error", "always"]));
    } else {
        config
            .rules
            .insert("semi".to_string(), json!(["error", "never"]));
        config.rules.insert(
            "semi-spacing".to_string(),
            json!(["error", {"before": false, "after": true}]),
        );
    }

    config
}

fn with_formatter(
    mut config: MergedConfig,
    options: &Options,
    cwd: &Path,
    reader: &dyn ConfigReader,
) -> Result<MergedConfig> {
    if !options.prettier_enabled() {
        return Ok(config);
    }

    let start = options
        .filename
        .as_ref()
        .and_then(|filename| cwd.join(filename).parent().map(Path::to_path_buf))
        .unwrap_or_else(|| cwd.to_path_buf());
    let discovered = find_formatter_config(reader, &start)?;

    config.plugins.push("prettier".to_string());
    config.rules.insert(
        "prettier/prettier".to_string(),
        json!(["error", Value::Object(formatter_options(options, discovered.as_ref()))]),
    );

    Ok(config)
}

fn with_engine_rules(mut config: MergedConfig, options: &Options) -> MergedConfig {
    config.rules.extend(engine_rules(options.engines.as_ref()));
    config
}

fn with_extends(
    mut config: MergedConfig,
    options: &Options,
    cwd: &Path,
    context: &MergeContext,
) -> Result<MergedConfig> {
    let mut seen: IndexSet<String> = config.extends.iter().cloned().collect();
    let mut chain = std::mem::take(&mut config.extends);

    for name in options.extends.iter().flatten() {
        if name == PRETTIER_PRESET && options.prettier_enabled() {
            continue;
        }
        let (key, entry) = resolve_extends(name, cwd, context)?;
        if seen.insert(key) {
            chain.push(entry);
        }
    }

    if options.prettier_enabled() {
        chain.push(PRETTIER_PRESET.to_string());
    }

    config.extends = chain;
    Ok(config)
}

/// Resolve one `extends` entry to `(dedup key, chain entry)`
fn resolve_extends(name: &str, cwd: &Path, context: &MergeContext) -> Result<(String, String)> {
    if name.starts_with("plugin:") {
        return Ok((name.to_string(), name.to_string()));
    }

    let as_file = cwd.join(name);
    if context.reader.is_file(&as_file) {
        return Ok((as_file.to_string_lossy().into_owned(), name.to_string()));
    }

    let module = shareable_config_name(name);
    match context.resolver.resolve(&module, cwd) {
        Some(path) => {
            let resolved = path.to_string_lossy().into_owned();
            debug!("Resolved extends {} to {}", name, resolved);
            Ok((resolved.clone(), resolved))
        }
        None => Err(KumiError::extends_not_found(name)),
    }
}

fn with_explicit_options(mut config: MergedConfig, options: &Options) -> MergedConfig {
    if let Some(rules) = &options.rules {
        for (rule, value) in rules {
            config.rules.insert(rule.clone(), value.clone());
        }
    }
    if let Some(settings) = &options.settings {
        for (key, value) in settings {
            config.settings.insert(key.clone(), value.clone());
        }
    }
    if options.parser.is_some() {
        config.parser.clone_from(&options.parser);
    }

    let plugins: IndexSet<String> = config
        .plugins
        .drain(..)
        .chain(options.plugins.iter().flatten().cloned())
        .collect();
    config.plugins = plugins.into_iter().collect();

    config
}
