//! Error types and handling for configuration composition

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kumi operations
#[derive(Debug, Error)]
pub enum KumiError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// An `extends` entry could not be resolved to a module
    #[error("Couldn't find shareable config: {name}")]
    ExtendsNotFound { name: String },

    /// Glob pattern in `files`, `ignores` or an override could not be compiled
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Malformed configuration source (JSON, JSONC or TOML)
    #[error("Failed to parse '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the lint-execution engine
    #[error("Lint engine error: {message}")]
    EngineError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    ExtendsNotFound,
    Pattern,
    Parse,
    Io,
    Engine,
}

impl KumiError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KumiError::ConfigError { .. } => ErrorKind::Config,
            KumiError::ExtendsNotFound { .. } => ErrorKind::ExtendsNotFound,
            KumiError::InvalidPattern { .. } => ErrorKind::Pattern,
            KumiError::ParseError { .. } => ErrorKind::Parse,
            KumiError::IoError { .. } => ErrorKind::Io,
            KumiError::EngineError { .. } => ErrorKind::Engine,
        }
    }

    /// Check if this error only affects one group (other groups keep going)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ExtendsNotFound | ErrorKind::Engine
        )
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an unresolved `extends` error
    pub fn extends_not_found(name: impl Into<String>) -> Self {
        Self::ExtendsNotFound { name: name.into() }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a parse error for a configuration source
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a lint engine error
    pub fn engine_error(message: impl Into<String>) -> Self {
        Self::EngineError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for KumiError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
