//! kumi core
//!
//! Override resolution and configuration merging for a JavaScript lint
//! composer. Given caller options, the project configuration found on disk
//! and a list of path-scoped overrides, kumi computes the exact lint
//! configuration for every file and groups files that share one, so the
//! lint engine runs once per distinct configuration.
//!
//! Pipeline: [`options`] normalization, nearest-config discovery
//! ([`config::ConfigLoader`]), per-file override matching and grouping
//! ([`overrides`]), then [`config::ConfigBuilder`] builds a
//! [`MergedConfig`] per group for the [`LintEngine`].

pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod linter;
pub mod options;
pub mod overrides;
pub mod result;

// Re-export commonly used types
pub use config::{
    ConfigBuilder, ConfigLoader, ConfigReader, ConfigSource, DiskReader, MemoryReader,
    MergeContext, MergedConfig, ModuleResolver, NodeModulesResolver,
};
pub use discovery::FileFilter;
pub use engine::{
    FileResult, GroupFailure, LintEngine, LintMessage, LintReport, Severity, error_results,
    merge_reports,
};
pub use error::{ErrorKind, KumiError};
pub use linter::Linter;
pub use options::{Engines, Options, OverrideRule, Space, normalize_options};
pub use overrides::{
    Group, MembershipMask, OverrideMatch, OverrideMatcher, find_applicable_overrides,
    group_configs, merge_applicable_overrides,
};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so JSON written to stdout stays parseable.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kumi=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
