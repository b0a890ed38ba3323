//! automessages - rotating auto-broadcasts for game server proxies
//!
//! Sends configured chat messages to players on a proxy at fixed intervals.
//! Each configuration section is an independent group with its own audience,
//! interval and rotation order.
//!
//! # Architecture
//!
//! - [`config`] - TOML configuration file and per-group sections
//! - [`broadcast`] - Audience resolution, message catalog, rotation and the group lifecycle
//! - [`supervisor`] - Loads the configuration and owns the running groups
//! - [`scheduler`] - Cancellable repeating and delayed tasks on tokio
//! - [`host`] - Proxy, server and player traits plus an in-memory host
//! - [`text`] - Chat components and legacy `&` code parsing
//! - [`metrics`] - Prometheus counters for ticks and deliveries
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use automessages::host::memory::MemoryProxy;
//! use automessages::supervisor::{Supervisor, STARTUP_DELAY};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let proxy = Arc::new(MemoryProxy::new().with_servers(["lobby1", "lobby2"]));
//!     let supervisor = Supervisor::current(proxy, "config.toml")?;
//!     supervisor.enable(false, Some(STARTUP_DELAY))?;
//!     tokio::signal::ctrl_c().await?;
//!     supervisor.shutdown();
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod scheduler;
pub mod supervisor;
pub mod text;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::broadcast::{Audience, BroadcastGroup, MessageCatalog, Rotation, StartError};
    pub use crate::config::{AutoMessagesConfig, GroupConfig};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::host::{BackendServer, Player, Proxy, ServerLookup};
    pub use crate::scheduler::Scheduler;
    pub use crate::supervisor::Supervisor;
    pub use crate::text::Component;
}

// Direct re-exports for convenience
pub use broadcast::BroadcastGroup;
pub use supervisor::Supervisor;
