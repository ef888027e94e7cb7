//! Option normalization
//!
//! Users write `env: "node"` as readily as `envs: ["node"]`. Normalization
//! folds the singular aliases into their plural keys and wraps scalar values
//! of list-valued keys, then deserializes into [`Options`].

use super::{Engines, Options};
use crate::{KumiError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// List-valued keys as `(alias, canonical)`
const LIST_KEYS: &[(&str, &str)] = &[
    ("env", "envs"),
    ("global", "globals"),
    ("ignore", "ignores"),
    ("plugin", "plugins"),
    ("extend", "extends"),
    ("extension", "extensions"),
];

/// Map-valued keys as `(alias, canonical)`
const MAP_KEYS: &[(&str, &str)] = &[("rule", "rules"), ("setting", "settings")];

const SCALAR_KEYS: &[&str] = &[
    "parser",
    "space",
    "semicolon",
    "prettier",
    "esnext",
    "engines",
    "cwd",
    "filename",
    "stdinFilename",
    "fix",
    "quiet",
    "overrides",
    "files",
];

/// Normalize a raw options value into [`Options`]
pub fn normalize_options(raw: &Value) -> Result<Options> {
    let normalized = normalize_value(raw)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| KumiError::config_error(format!("Invalid options: {e}")))
}

/// Normalize a raw options value, keeping it as a JSON object
///
/// Absent keys stay absent and `null` counts as absent.
pub fn normalize_value(raw: &Value) -> Result<Map<String, Value>> {
    let Value::Object(input) = raw else {
        return Err(KumiError::config_error(format!(
            "Options must be an object, got {}",
            type_name(raw)
        )));
    };

    let mut output = input.clone();

    for (alias, canonical) in LIST_KEYS {
        if let Some(value) = take_aliased(&mut output, alias, canonical) {
            output.insert((*canonical).to_string(), Value::Array(arrify(value)));
        }
    }

    for (alias, canonical) in MAP_KEYS {
        if let Some(value) = take_aliased(&mut output, alias, canonical) {
            if !value.is_object() {
                return Err(KumiError::config_error(format!(
                    "`{canonical}` must be an object, got {}",
                    type_name(&value)
                )));
            }
            output.insert((*canonical).to_string(), value);
        }
    }

    if let Some(version) = output.remove("nodeVersion") {
        // An explicit `engines` key wins over the shorthand
        if !output.contains_key("engines") {
            let engines = match version {
                Value::String(range) => serde_json::json!({ "node": range }),
                Value::Null => Value::Null,
                Value::Bool(enabled) => Value::Bool(enabled),
                other => {
                    debug!("Ignoring invalid `nodeVersion`: {}", other);
                    Value::Object(Map::new())
                }
            };
            output.insert("engines".to_string(), engines);
        }
    }

    if let Some(engines) = output.get_mut("engines")
        && !engines.is_null()
        && serde_json::from_value::<Engines>(engines.clone()).is_err()
    {
        debug!("Ignoring invalid `engines`: {}", engines);
        *engines = Value::Object(Map::new());
    }

    if let Some(overrides) = output.remove("overrides") {
        if !overrides.is_null() {
            let normalized = arrify(overrides)
                .iter()
                .map(normalize_override)
                .collect::<Result<Vec<_>>>()?;
            output.insert("overrides".to_string(), Value::Array(normalized));
        }
    }

    output.retain(|_, value| !value.is_null());

    for key in output.keys() {
        let known = SCALAR_KEYS.contains(&key.as_str())
            || LIST_KEYS.iter().any(|(_, canonical)| canonical == key)
            || MAP_KEYS.iter().any(|(_, canonical)| canonical == key);
        if !known {
            debug!("Ignoring unknown option `{}`", key);
        }
    }

    Ok(output)
}

/// Normalize one override entry: its `files` become a list
fn normalize_override(entry: &Value) -> Result<Value> {
    let mut normalized = normalize_value(entry)?;
    let files = normalized
        .remove("files")
        .map(arrify)
        .unwrap_or_default();
    normalized.insert("files".to_string(), Value::Array(files));
    Ok(Value::Object(normalized))
}

/// Take the canonical key, falling back to its alias; the alias is always removed
fn take_aliased(map: &mut Map<String, Value>, alias: &str, canonical: &str) -> Option<Value> {
    let from_alias = map.remove(alias).filter(|v| !v.is_null());
    match map.remove(canonical).filter(|v| !v.is_null()) {
        Some(value) => Some(value),
        None => from_alias,
    }
}

/// Wrap a scalar into a single-element list
fn arrify(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
