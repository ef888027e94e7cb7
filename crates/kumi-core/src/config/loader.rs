//! Configuration file discovery and loading

use super::presets::{default_extensions, default_ignores};
use super::reader::{ConfigReader, DiskReader};
use crate::options::{Engines, Options, normalize_options};
use crate::{KumiError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Field of `package.json` holding kumi options
pub const MANIFEST_FIELD: &str = "kumi";

/// Project manifest checked last at every directory level
pub const MANIFEST_FILE: &str = "package.json";

/// Format of a configuration source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `kumi.config.toml`
    Toml,
    /// `kumi.config.json`
    Json,
    /// `.kumi-config.json` or `.kumi-config`, comments allowed
    Jsonc,
    /// The `kumi` field of `package.json`
    Manifest,
}

/// Config files per directory level, in priority order
pub const CONFIG_FILES: &[(&str, ConfigFormat)] = &[
    ("kumi.config.toml", ConfigFormat::Toml),
    ("kumi.config.json", ConfigFormat::Json),
    (".kumi-config.json", ConfigFormat::Jsonc),
    (".kumi-config", ConfigFormat::Jsonc),
    (MANIFEST_FILE, ConfigFormat::Manifest),
];

/// A project configuration found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub options: Options,
}

impl ConfigSource {
    /// Directory the source was found in
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// What one candidate file contributed
enum Candidate {
    /// File absent, or a manifest without a `kumi` field
    Missing,
    /// Literal `false`: skip this directory level
    Disabled,
    Found(Value),
}

/// Walks up the directory tree to find and inherit project configuration
#[derive(Clone)]
pub struct ConfigLoader {
    reader: Arc<dyn ConfigReader>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(Arc::new(DiskReader))
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader").finish_non_exhaustive()
    }
}

impl ConfigLoader {
    pub fn new(reader: Arc<dyn ConfigReader>) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &Arc<dyn ConfigReader> {
        &self.reader
    }

    /// Find the nearest project configuration, starting at `start_dir`
    ///
    /// At each level the files in [`CONFIG_FILES`] are tried in order. The
    /// first one present decides the level: `false` skips to the parent
    /// directory, anything else is normalized and returned.
    pub fn find_nearest_config(&self, start_dir: &Path) -> Result<Option<ConfigSource>> {
        'levels: for dir in start_dir.ancestors() {
            for (filename, format) in CONFIG_FILES {
                let path = dir.join(filename);
                match self.read_candidate(&path, *format)? {
                    Candidate::Missing => continue,
                    Candidate::Disabled => {
                        debug!("Config disabled at {}, trying parent", path.display());
                        continue 'levels;
                    }
                    Candidate::Found(value) => {
                        debug!("Found config: {}", path.display());
                        let options = normalize_options(&value).map_err(|e| {
                            KumiError::config_error(format!("{}: {}", path.display(), e))
                        })?;
                        return Ok(Some(ConfigSource {
                            path,
                            format: *format,
                            options,
                        }));
                    }
                }
            }
        }

        Ok(None)
    }

    /// `engines` of the nearest `package.json`, empty when none declares it
    pub fn find_manifest_engines(&self, start_dir: &Path) -> Result<Engines> {
        for dir in start_dir.ancestors() {
            let path = dir.join(MANIFEST_FILE);
            let Some(manifest) = self.read_manifest(&path)? else {
                continue;
            };
            return match manifest.get("engines") {
                None | Some(Value::Null) => Ok(Engines::empty()),
                Some(engines) => Ok(serde_json::from_value(engines.clone()).unwrap_or_else(|e| {
                    debug!("Ignoring invalid `engines` in {}: {}", path.display(), e);
                    Engines::empty()
                })),
            };
        }

        Ok(Engines::empty())
    }

    /// Layer project configuration under the caller's options
    ///
    /// Precedence, lowest first: the nearest project config, the manifest
    /// `engines`, then every key the caller set. `cwd` defaults to the
    /// process working directory and is made absolute.
    pub fn merge_with_project_config(&self, options: Options) -> Result<Options> {
        let cwd = resolve_cwd(options.cwd.as_deref())?;
        self.merge_from(options, &cwd, &cwd)
    }

    /// Normalize options and resolve everything discovered on disk
    ///
    /// Project config is searched from the directory of `filename` when one
    /// is given, otherwise from `cwd`. Default ignores and extensions are
    /// prepended to whatever the options declare.
    pub fn preprocess(&self, options: Options) -> Result<Options> {
        let cwd = resolve_cwd(options.cwd.as_deref())?;
        let start = match &options.filename {
            Some(filename) => cwd
                .join(filename)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone()),
            None => cwd.clone(),
        };

        let mut merged = self.merge_from(options, &cwd, &start)?;

        let mut ignores = default_ignores();
        ignores.extend(merged.ignores.take().unwrap_or_default());
        merged.ignores = Some(ignores);

        let mut extensions = default_extensions();
        extensions.extend(merged.extensions.take().unwrap_or_default());
        merged.extensions = Some(extensions);

        Ok(merged)
    }

    /// [`preprocess`](Self::preprocess) for loosely-shaped input
    pub fn preprocess_value(&self, raw: &Value) -> Result<Options> {
        self.preprocess(normalize_options(raw)?)
    }

    fn merge_from(&self, options: Options, cwd: &Path, start: &Path) -> Result<Options> {
        let mut project = self
            .find_nearest_config(start)?
            .map(|source| source.options)
            .unwrap_or_default();
        project.engines = Some(self.find_manifest_engines(start)?);

        let mut merged = options;
        merged.fill_from(project);
        merged.cwd = Some(cwd.to_path_buf());
        Ok(merged)
    }

    fn read_candidate(&self, path: &Path, format: ConfigFormat) -> Result<Candidate> {
        let value = match format {
            ConfigFormat::Manifest => match self.read_manifest(path)? {
                Some(manifest) => manifest.get(MANIFEST_FIELD).cloned(),
                None => None,
            },
            _ => match self.reader.read(path)? {
                Some(content) => Some(parse_source(path, &content, format)?),
                None => None,
            },
        };

        Ok(match value {
            None => Candidate::Missing,
            Some(Value::Bool(false)) => Candidate::Disabled,
            Some(value) => Candidate::Found(value),
        })
    }

    fn read_manifest(&self, path: &Path) -> Result<Option<Value>> {
        match self.reader.read(path)? {
            Some(content) => parse_source(path, &content, ConfigFormat::Json).map(Some),
            None => Ok(None),
        }
    }
}

fn parse_source(path: &Path, content: &str, format: ConfigFormat) -> Result<Value> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str::<toml::Table>(content)
            .map_err(|e| e.to_string())
            .and_then(|value| serde_json::to_value(value).map_err(|e| e.to_string())),
        ConfigFormat::Json | ConfigFormat::Manifest => {
            serde_json::from_str::<Value>(content).map_err(|e| e.to_string())
        }
        ConfigFormat::Jsonc => json5::from_str::<Value>(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| KumiError::parse_error(path, message))
}

/// Absolute working directory, defaulting to the process's
fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let cwd = match cwd {
        Some(cwd) => cwd.to_path_buf(),
        None => std::env::current_dir()?,
    };
    std::path::absolute(&cwd).map_err(|e| KumiError::io_error(cwd, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::reader::MemoryReader;
    use crate::options::Space;
    use indexmap::IndexMap;

    fn loader(reader: MemoryReader) -> ConfigLoader {
        ConfigLoader::new(Arc::new(reader))
    }

    fn nested_fixture() -> MemoryReader {
        MemoryReader::new()
            .with_file("/nested/package.json", r#"{"kumi": {"semicolon": true}}"#)
            .with_file("/nested/child/package.json", r#"{"kumi": {"semicolon": false}}"#)
            .with_file("/nested/child-ignore/package.json", r#"{"kumi": false}"#)
            .with_file("/nested/child-empty/package.json", r#"{"kumi": {}}"#)
            .with_file("/nested/no-field/package.json", r#"{"name": "no-field"}"#)
    }

    fn with_cwd(cwd: &str) -> Options {
        Options {
            cwd: Some(PathBuf::from(cwd)),
            ..Default::default()
        }
    }

    #[test]
    fn test_use_child_if_closest() {
        let result = loader(nested_fixture())
            .merge_with_project_config(with_cwd("/nested/child"))
            .unwrap();

        assert_eq!(
            result,
            Options {
                semicolon: Some(false),
                cwd: Some("/nested/child".into()),
                engines: Some(Engines::empty()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_use_parent_if_closest() {
        let result = loader(nested_fixture())
            .merge_with_project_config(with_cwd("/nested"))
            .unwrap();

        assert_eq!(result.semicolon, Some(true));
        assert_eq!(result.cwd, Some("/nested".into()));
        assert_eq!(result.engines, Some(Engines::empty()));
    }

    #[test]
    fn test_use_parent_if_child_is_ignored() {
        let result = loader(nested_fixture())
            .merge_with_project_config(with_cwd("/nested/child-ignore"))
            .unwrap();

        assert_eq!(result.semicolon, Some(true));
        assert_eq!(result.cwd, Some("/nested/child-ignore".into()));
    }

    #[test]
    fn test_use_child_if_child_is_empty() {
        let result = loader(nested_fixture())
            .merge_with_project_config(with_cwd("/nested/child-empty"))
            .unwrap();

        assert_eq!(
            result,
            Options {
                cwd: Some("/nested/child-empty".into()),
                engines: Some(Engines::empty()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_manifest_without_field_falls_through() {
        let result = loader(nested_fixture())
            .merge_with_project_config(with_cwd("/nested/no-field"))
            .unwrap();
        assert_eq!(result.semicolon, Some(true));
    }

    #[test]
    fn test_no_config_anywhere() {
        let result = loader(MemoryReader::new())
            .merge_with_project_config(with_cwd("/empty"))
            .unwrap();

        assert_eq!(
            result,
            Options {
                cwd: Some("/empty".into()),
                engines: Some(Engines::empty()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_read_engines_from_manifest() {
        let reader = MemoryReader::new()
            .with_file("/engines/package.json", r#"{"engines": {"node": ">=6"}}"#);
        let result = loader(reader)
            .merge_with_project_config(with_cwd("/engines"))
            .unwrap();

        assert_eq!(
            result.engines,
            Some(Engines::Constraints(IndexMap::from([(
                "node".to_string(),
                ">=6".to_string()
            )])))
        );
    }

    #[test]
    fn test_invalid_manifest_engines_are_ignored() {
        for engines in [r#"{"node": 8}"#, r#"["node >= 6"]"#] {
            let reader = MemoryReader::new().with_file(
                "/p/package.json",
                format!(r#"{{"engines": {engines}}}"#),
            );
            let result = loader(reader).preprocess(with_cwd("/p")).unwrap();

            assert_eq!(result.engines, Some(Engines::empty()));
            assert!(crate::config::engines::engine_rules(result.engines.as_ref()).is_empty());
        }
    }

    #[test]
    fn test_caller_engines_supersede_manifest() {
        let reader = MemoryReader::new()
            .with_file("/engines/package.json", r#"{"engines": {"node": ">=6"}}"#);
        let loader = loader(reader);

        let mut options = with_cwd("/engines");
        options.engines = Some(Engines::Constraints(IndexMap::from([(
            "node".to_string(),
            ">=8".to_string(),
        )])));
        let result = loader.merge_with_project_config(options).unwrap();
        assert_eq!(result.engines.as_ref().and_then(Engines::node), Some(">=8"));

        let mut options = with_cwd("/engines");
        options.engines = Some(Engines::Enabled(false));
        let result = loader.merge_with_project_config(options).unwrap();
        assert_eq!(result.engines, Some(Engines::Enabled(false)));
    }

    #[test]
    fn test_caller_keys_win_over_project_config() {
        let reader = MemoryReader::new().with_file(
            "/p/kumi.config.json",
            r#"{"space": 4, "envs": ["node"], "semicolon": false}"#,
        );
        let mut options = with_cwd("/p");
        options.space = Some(Space::Enabled(true));

        let result = loader(reader).merge_with_project_config(options).unwrap();

        assert_eq!(result.space, Some(Space::Enabled(true)));
        assert_eq!(result.envs, Some(vec!["node".to_string()]));
        assert_eq!(result.semicolon, Some(false));
    }

    #[test]
    fn test_source_priority_within_level() {
        let reader = MemoryReader::new()
            .with_file("/p/kumi.config.toml", "space = 3\n")
            .with_file("/p/kumi.config.json", r#"{"space": 4}"#)
            .with_file("/p/.kumi-config", "{ space: 5 }")
            .with_file("/p/package.json", r#"{"kumi": {"space": 6}}"#);

        let source = loader(reader).find_nearest_config(Path::new("/p")).unwrap().unwrap();

        assert_eq!(source.format, ConfigFormat::Toml);
        assert_eq!(source.options.space, Some(Space::Width(3)));
        assert_eq!(source.dir(), Path::new("/p"));
    }

    #[test]
    fn test_dotfile_allows_comments() {
        let reader = MemoryReader::new().with_file(
            "/p/.kumi-config.json",
            "{\n  // test files\n  \"semicolon\": false,\n  \"env\": \"mocha\",\n}",
        );

        let source = loader(reader).find_nearest_config(Path::new("/p/src")).unwrap().unwrap();

        assert_eq!(source.format, ConfigFormat::Jsonc);
        assert_eq!(source.options.semicolon, Some(false));
        assert_eq!(source.options.envs, Some(vec!["mocha".to_string()]));
    }

    #[test]
    fn test_disabled_dotfile_skips_level() {
        let reader = MemoryReader::new()
            .with_file("/p/child/.kumi-config", "false")
            .with_file("/p/child/package.json", r#"{"kumi": {"space": 8}}"#)
            .with_file("/p/kumi.config.json", r#"{"esnext": false}"#);

        let source = loader(reader)
            .find_nearest_config(Path::new("/p/child"))
            .unwrap()
            .unwrap();

        assert_eq!(source.path, PathBuf::from("/p/kumi.config.json"));
        assert_eq!(source.options.esnext, Some(false));
    }

    #[test]
    fn test_malformed_config_fails() {
        let reader = MemoryReader::new().with_file("/p/kumi.config.json", "{ nope");
        let err = loader(reader).find_nearest_config(Path::new("/p")).unwrap_err();
        assert!(err.to_string().contains("kumi.config.json"));
    }

    #[test]
    fn test_preprocess_prepends_defaults() {
        let reader = MemoryReader::new()
            .with_file("/p/package.json", r#"{"kumi": {"ignores": "build/**", "extension": "ts"}}"#);

        let options = loader(reader).preprocess(with_cwd("/p")).unwrap();

        let ignores = options.ignores.unwrap();
        assert_eq!(ignores[0], "**/node_modules/**");
        assert_eq!(ignores.last().map(String::as_str), Some("build/**"));
        assert_eq!(
            options.extensions,
            Some(vec!["js".to_string(), "jsx".to_string(), "ts".to_string()])
        );
    }

    #[test]
    fn test_preprocess_starts_from_filename() {
        let reader = MemoryReader::new()
            .with_file("/p/package.json", r#"{"kumi": {"space": 2}}"#)
            .with_file("/p/sub/package.json", r#"{"kumi": {"space": 4}}"#);

        let mut options = with_cwd("/p");
        options.filename = Some("sub/index.js".into());
        let options = loader(reader).preprocess(options).unwrap();

        assert_eq!(options.space, Some(Space::Width(4)));
        assert_eq!(options.cwd, Some("/p".into()));
    }

    #[test]
    fn test_preprocess_value_normalizes() {
        let options = loader(MemoryReader::new())
            .preprocess_value(&serde_json::json!({"cwd": "/p", "env": "node"}))
            .unwrap();
        assert_eq!(options.envs, Some(vec!["node".to_string()]));
    }
}
