//! Error types for the scheduler module

use std::fmt;
use std::time::Duration;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No tokio runtime is available to spawn onto
    NoRuntime { reason: String },

    /// Repeating period must be non-zero
    InvalidPeriod { period: Duration },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuntime { reason } => {
                write!(f, "No async runtime available: {}", reason)
            }
            Self::InvalidPeriod { period } => {
                write!(f, "Invalid repeat period {:?}. Must be greater than zero", period)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<tokio::runtime::TryCurrentError> for SchedulerError {
    fn from(err: tokio::runtime::TryCurrentError) -> Self {
        Self::NoRuntime {
            reason: err.to_string(),
        }
    }
}

impl SchedulerError {
    /// Create an invalid period error
    pub fn invalid_period(period: Duration) -> Self {
        Self::InvalidPeriod { period }
    }
}
