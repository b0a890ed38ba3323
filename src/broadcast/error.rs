//! Reasons a broadcast group refuses to start

use thiserror::Error;

use crate::scheduler::SchedulerError;

/// Why [`BroadcastGroup::start`](super::BroadcastGroup::start) did not start
/// the group
///
/// Checked in declaration order of the start sequence: messages, servers,
/// interval, then the running task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// The audience is a server list and none of the servers resolved
    #[error("servers are not specified or empty")]
    NoServers,

    /// The catalog has no messages
    #[error("messages are not specified or empty")]
    NoMessages,

    /// The interval is zero or negative
    #[error("interval is not specified or <=0")]
    IntervalNotSet,

    /// The group already has a running task
    #[error("group is already running")]
    AlreadyRunning,

    /// The runtime refused the repeating task
    #[error("failed to schedule the group: {0}")]
    Scheduler(#[source] SchedulerError),
}

impl StartError {
    /// Short machine-readable reason, used as a metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoServers => "no_servers",
            Self::NoMessages => "no_messages",
            Self::IntervalNotSet => "interval_not_set",
            Self::AlreadyRunning => "already_running",
            Self::Scheduler(_) => "scheduler",
        }
    }
}
