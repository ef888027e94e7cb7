//! Module resolution for `extends` entries and optional plugins

use super::reader::{ConfigReader, DiskReader};
use crate::{KumiError, ResultExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves a module identifier to a location, anchored at a directory
pub trait ModuleResolver: Send + Sync {
    /// Location of `id` as seen from `cwd`, `None` when it cannot be found
    fn resolve(&self, id: &str, cwd: &Path) -> Option<PathBuf>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str, &Path) -> Option<PathBuf> + Send + Sync,
{
    fn resolve(&self, id: &str, cwd: &Path) -> Option<PathBuf> {
        self(id, cwd)
    }
}

/// Looks for `node_modules/<id>` in `cwd` and each of its ancestors
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesResolver;

impl ModuleResolver for NodeModulesResolver {
    fn resolve(&self, id: &str, cwd: &Path) -> Option<PathBuf> {
        for dir in cwd.ancestors() {
            let candidate = dir.join("node_modules").join(id);
            if let Some(entry) = package_entry(&candidate) {
                debug!("Resolved {} to {}", id, entry.display());
                return Some(entry);
            }
            let file = candidate.with_extension("js");
            if file.is_file() {
                return Some(file);
            }
        }
        debug!("Could not resolve {} from {}", id, cwd.display());
        None
    }
}

/// Entry file of a package directory: its manifest `main`, else `index.js`
fn package_entry(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let manifest_path = dir.join("package.json");
    let main = DiskReader
        .read(&manifest_path)
        .log_and_continue()
        .flatten()
        .and_then(|content| {
            serde_json::from_str::<Value>(&content)
                .map_err(|e| KumiError::parse_error(&manifest_path, e.to_string()))
                .log_and_continue()
        })
        .and_then(|manifest| manifest.get("main").and_then(Value::as_str).map(str::to_string));

    let mut candidates = Vec::new();
    if let Some(main) = main {
        let main = dir.join(main);
        candidates.push(main.with_extension("js"));
        candidates.push(main.join("index.js"));
        candidates.push(main);
    }
    candidates.push(dir.join("index.js"));

    candidates
        .into_iter()
        .find(|path| path.is_file())
        .or_else(|| Some(dir.to_path_buf()))
}

/// Expand a shareable config name to its full package name
///
/// `foo` becomes `eslint-config-foo`, `@scope` becomes
/// `@scope/eslint-config` and `@scope/foo` becomes `@scope/eslint-config-foo`.
pub fn shareable_config_name(name: &str) -> String {
    const PREFIX: &str = "eslint-config";

    if let Some(scoped) = name.strip_prefix('@') {
        return match scoped.split_once('/') {
            None => format!("@{scoped}/{PREFIX}"),
            Some((_, rest)) if rest.starts_with(PREFIX) => name.to_string(),
            Some((scope, rest)) => format!("@{scope}/{PREFIX}-{rest}"),
        };
    }

    if name.starts_with(&format!("{PREFIX}-")) {
        name.to_string()
    } else {
        format!("{PREFIX}-{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_shareable_config_name() {
        assert_eq!(shareable_config_name("foo-bar-two"), "eslint-config-foo-bar-two");
        assert_eq!(shareable_config_name("eslint-config-foo-bar"), "eslint-config-foo-bar");
        assert_eq!(shareable_config_name("@acme"), "@acme/eslint-config");
        assert_eq!(shareable_config_name("@acme/web"), "@acme/eslint-config-web");
        assert_eq!(shareable_config_name("@acme/eslint-config-web"), "@acme/eslint-config-web");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |id: &str, cwd: &Path| Some(cwd.join(id));
        assert_eq!(
            resolver.resolve("eslint-config-foo", Path::new("cwd")),
            Some(PathBuf::from("cwd/eslint-config-foo"))
        );
    }

    #[test]
    fn test_node_modules_resolver_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let package = temp_dir.path().join("node_modules/eslint-config-foo");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("package.json"), r#"{"main": "config.js"}"#).unwrap();
        fs::write(package.join("config.js"), "module.exports = {};").unwrap();
        let nested = temp_dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let resolved = NodeModulesResolver.resolve("eslint-config-foo", &nested).unwrap();
        assert_eq!(resolved, package.join("config.js"));
    }

    #[test]
    fn test_node_modules_resolver_index_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let package = temp_dir.path().join("node_modules/eslint-plugin-react");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("index.js"), "").unwrap();

        let resolved = NodeModulesResolver.resolve("eslint-plugin-react", temp_dir.path());
        assert_eq!(resolved, Some(package.join("index.js")));
    }

    #[test]
    fn test_node_modules_resolver_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(
            NodeModulesResolver
                .resolve("eslint-config-missing", temp_dir.path())
                .is_none()
        );
    }
}
