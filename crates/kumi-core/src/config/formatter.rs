//! Style-formatter (prettier) integration
//!
//! The synthesized `prettier/prettier` rule takes its options from three
//! layers, later ones winning: kumi's style defaults, the nearest formatter
//! config on disk, then values derived from `space` and `semicolon`.

use super::reader::ConfigReader;
use crate::options::Options;
use crate::{KumiError, Result};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Formatter config files checked per directory, before `package.json`
pub const FORMATTER_CONFIG_FILES: &[&str] = &[".prettierrc", ".prettierrc.json"];

/// `package.json` field holding formatter options
pub const FORMATTER_MANIFEST_FIELD: &str = "prettier";

/// Formatter options discovered on disk
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    pub path: PathBuf,
    pub options: Map<String, Value>,
}

/// Find the formatter config nearest to `start_dir`
pub fn find_formatter_config(
    reader: &dyn ConfigReader,
    start_dir: &Path,
) -> Result<Option<FormatterConfig>> {
    for dir in start_dir.ancestors() {
        for filename in FORMATTER_CONFIG_FILES {
            let path = dir.join(filename);
            let Some(content) = reader.read(&path)? else {
                continue;
            };
            let value: Value = if filename.ends_with(".json") {
                serde_json::from_str(&content).map_err(|e| e.to_string())
            } else {
                json5::from_str(&content).map_err(|e| e.to_string())
            }
            .map_err(|message| KumiError::parse_error(&path, message))?;
            debug!("Found formatter config: {}", path.display());
            return Ok(Some(FormatterConfig {
                options: into_object(&path, value)?,
                path,
            }));
        }

        let manifest = dir.join("package.json");
        if let Some(content) = reader.read(&manifest)? {
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| KumiError::parse_error(&manifest, e.to_string()))?;
            if let Some(field) = value.get(FORMATTER_MANIFEST_FIELD) {
                debug!("Found formatter config in {}", manifest.display());
                return Ok(Some(FormatterConfig {
                    options: into_object(&manifest, field.clone())?,
                    path: manifest,
                }));
            }
        }
    }

    Ok(None)
}

fn into_object(path: &Path, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(KumiError::parse_error(
            path,
            "formatter options must be an object",
        )),
    }
}

/// Style defaults, before any discovered config
pub fn formatter_defaults(esnext: bool) -> Map<String, Value> {
    let trailing_comma = if esnext { "es5" } else { "none" };
    let defaults = json!({
        "singleQuote": true,
        "bracketSpacing": false,
        "jsxBracketSameLine": false,
        "trailingComma": trailing_comma,
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Layer defaults, the discovered config and option-derived values
pub fn formatter_options(
    options: &Options,
    discovered: Option<&FormatterConfig>,
) -> Map<String, Value> {
    let mut merged = formatter_defaults(options.esnext_enabled());

    if let Some(config) = discovered {
        for (key, value) in &config.options {
            merged.insert(key.clone(), value.clone());
        }
    }

    let width = options.space_width();
    merged.insert("tabWidth".to_string(), json!(width.unwrap_or(2)));
    merged.insert("useTabs".to_string(), json!(width.is_none()));
    merged.insert("semi".to_string(), json!(options.semicolon_required()));
    merged
}
