//! Canonical option schema
//!
//! Every option source (call site, project config, override rule) is
//! normalized into [`Options`] before anything else looks at it. Fields are
//! `Option`s on purpose: an absent key means "not specified here" and is
//! never defaulted in this layer. Defaults live in the config merger.
//!
//! ## Example (project config)
//!
//! ```jsonc
//! {
//!   "space": 4,
//!   "semicolon": false,
//!   "envs": ["node"],
//!   "rules": { "no-console": "warn" },
//!   "overrides": [
//!     { "files": "test/**/*.js", "env": "mocha" }
//!   ]
//! }
//! ```

mod normalize;

pub use normalize::{normalize_options, normalize_value};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Rule table: rule id to severity or `[severity, ...options]`
pub type RuleMap = IndexMap<String, Value>;

/// Shared settings handed to rules and plugins
pub type SettingsMap = IndexMap<String, Value>;

/// Indentation request
///
/// `true` asks for two spaces, a number asks for that exact width, `false`
/// (or `0`) asks for tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Space {
    Enabled(bool),
    Width(u32),
}

impl Space {
    /// Resolved width in spaces, `None` when tabs are requested
    pub fn width(self) -> Option<u32> {
        match self {
            Space::Enabled(true) => Some(2),
            Space::Enabled(false) | Space::Width(0) => None,
            Space::Width(width) => Some(width),
        }
    }
}

/// Runtime-version constraint (`engines` in a project manifest)
///
/// `false` switches version-gated rules off explicitly; a map carries one
/// semver range per runtime, of which only `node` is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Engines {
    Enabled(bool),
    Constraints(IndexMap<String, String>),
}

impl Engines {
    /// An empty constraint map
    pub fn empty() -> Self {
        Engines::Constraints(IndexMap::new())
    }

    /// The `node` range, if one was declared
    pub fn node(&self) -> Option<&str> {
        match self {
            Engines::Constraints(map) => map.get("node").map(String::as_str),
            Engines::Enabled(_) => None,
        }
    }
}

/// Canonical options object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envs: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignores: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Indentation width request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,

    /// Statement terminator policy (`false` forbids semicolons)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semicolon: Option<bool>,

    /// Style-formatter integration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prettier: Option<bool>,

    /// Modern syntax preset selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esnext: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<Engines>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_filename: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<bool>,

    /// Report errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<OverrideRule>>,
}

/// Path-scoped partial configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Glob patterns; `!`-prefixed entries exclude
    pub files: Vec<String>,

    #[serde(flatten)]
    pub options: Options,
}

impl OverrideRule {
    /// Build an override rule from patterns and options
    pub fn new(files: impl IntoIterator<Item = impl Into<String>>, options: Options) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            options,
        }
    }
}

impl Options {
    /// Normalize a loosely-shaped JSON value into options
    pub fn from_json(raw: &Value) -> crate::Result<Self> {
        normalize_options(raw)
    }

    /// Merge `other` over `self`
    ///
    /// - Scalars: `other` replaces when present
    /// - Lists: concatenated, order preserved, duplicates kept
    /// - Rule and settings maps: merged key-wise, `other` wins per key
    pub fn merge_from(&mut self, other: &Options) {
        append_list(&mut self.envs, &other.envs);
        append_list(&mut self.globals, &other.globals);
        append_list(&mut self.ignores, &other.ignores);
        append_list(&mut self.plugins, &other.plugins);
        append_list(&mut self.extends, &other.extends);
        append_list(&mut self.extensions, &other.extensions);

        merge_map(&mut self.rules, &other.rules);
        merge_map(&mut self.settings, &other.settings);

        replace(&mut self.parser, &other.parser);
        replace(&mut self.space, &other.space);
        replace(&mut self.semicolon, &other.semicolon);
        replace(&mut self.prettier, &other.prettier);
        replace(&mut self.esnext, &other.esnext);
        replace(&mut self.engines, &other.engines);
        replace(&mut self.cwd, &other.cwd);
        replace(&mut self.filename, &other.filename);
        replace(&mut self.stdin_filename, &other.stdin_filename);
        replace(&mut self.fix, &other.fix);
        replace(&mut self.quiet, &other.quiet);
        replace(&mut self.overrides, &other.overrides);
    }

    /// Fill keys absent here from `fallback`, keeping every key already set
    pub fn fill_from(&mut self, fallback: Options) {
        let mut base = fallback;
        base.merge_present(std::mem::take(self));
        *self = base;
    }

    /// Replace every key that `other` specifies, lists and maps included
    fn merge_present(&mut self, other: Options) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            envs, globals, ignores, plugins, rules, settings, extends, extensions, parser, space,
            semicolon, prettier, esnext, engines, cwd, filename, stdin_filename, fix, quiet,
            overrides
        );
    }

    /// Whether the modern syntax preset applies (default on)
    pub fn esnext_enabled(&self) -> bool {
        self.esnext != Some(false)
    }

    /// Whether the style-formatter integration is on
    pub fn prettier_enabled(&self) -> bool {
        self.prettier == Some(true)
    }

    /// Resolved indentation width, `None` for tabs
    pub fn space_width(&self) -> Option<u32> {
        self.space.and_then(Space::width)
    }

    /// Whether statements must end with a semicolon (default on)
    pub fn semicolon_required(&self) -> bool {
        self.semicolon != Some(false)
    }
}

fn append_list(target: &mut Option<Vec<String>>, source: &Option<Vec<String>>) {
    if let Some(items) = source {
        target.get_or_insert_with(Vec::new).extend(items.iter().cloned());
    }
}

fn merge_map(target: &mut Option<IndexMap<String, Value>>, source: &Option<IndexMap<String, Value>>) {
    if let Some(entries) = source {
        let map = target.get_or_insert_with(IndexMap::new);
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
    }
}

fn replace<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if source.is_some() {
        target.clone_from(source);
    }
}
