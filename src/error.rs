//! Unified error handling for the automessages crate
//!
//! Domain modules keep their own error types ([`ConfigError`],
//! [`StartError`], [`SchedulerError`]). [`Error`] is what the supervisor's
//! public API returns, and [`ErrorCategory`] classifies it for logging.
//!
//! # Usage
//!
//! ```rust,ignore
//! use automessages::error::Error;
//!
//! fn report(err: &Error) {
//!     tracing::warn!(error = %err, category = %err.category(), "Reload failed");
//! }
//! ```

use std::fmt;
use thiserror::Error;

pub use crate::broadcast::StartError;
pub use crate::config::ConfigError;
pub use crate::scheduler::error::SchedulerError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Group sections with the wrong shape
    Config,
    /// Malformed configuration file
    Parsing,
    /// Scheduler and runtime errors
    Scheduler,
    /// File system errors
    Storage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Parsing => "parsing",
            Self::Scheduler => "scheduler",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the automessages crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No runtime to schedule groups on
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl Error {
    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(ConfigError::Io { .. }) => ErrorCategory::Storage,
            Self::Config(ConfigError::Parse(_)) => ErrorCategory::Parsing,
            Self::Config(ConfigError::InvalidSection { .. }) => ErrorCategory::Config,
            Self::Scheduler(_) => ErrorCategory::Scheduler,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
