//! Configuration system for kumi
//!
//! - Nearest-config discovery by walking up from the working directory
//! - `package.json` `engines` and formatter config discovery
//! - Building the final engine configuration ([`MergedConfig`])
//!
//! ## Configuration Files
//!
//! Checked in each directory, first match wins:
//! 1. `kumi.config.toml`
//! 2. `kumi.config.json`
//! 3. `.kumi-config.json` / `.kumi-config` (comments and trailing commas allowed)
//! 4. the `kumi` field of `package.json`
//!
//! A source containing just `false` disables that directory level and the
//! search continues in the parent.
//!
//! ## Example Configuration
//!
//! ```toml
//! space = 4
//! semicolon = false
//! envs = ["node"]
//!
//! [rules]
//! no-console = "warn"
//!
//! [[overrides]]
//! files = "test/**/*.js"
//! env = "mocha"
//! ```

pub mod engines;
pub mod formatter;
mod loader;
mod merge;
pub mod presets;
mod reader;
pub mod resolve;

pub use loader::{
    CONFIG_FILES, ConfigFormat, ConfigLoader, ConfigSource, MANIFEST_FIELD, MANIFEST_FILE,
};
pub use merge::{ConfigBuilder, MergeContext, MergedConfig};
pub use presets::{DEFAULT_EXTENSIONS, DEFAULT_IGNORES, default_ignores};
pub use reader::{ConfigReader, DiskReader, MemoryReader};
pub use resolve::{ModuleResolver, NodeModulesResolver};
