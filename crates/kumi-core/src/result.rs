//! Result type alias for kumi operations

use crate::error::KumiError;

/// Standard Result type for kumi operations
pub type Result<T> = std::result::Result<T, KumiError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Log the error and continue with None
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                if err.is_recoverable() {
                    tracing::warn!("Continuing after error: {}", err);
                } else {
                    tracing::error!("Ignoring error: {}", err);
                }
                None
            }
        }
    }
}
