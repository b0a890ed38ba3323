//! Rotating broadcast groups
//!
//! A group owns a message catalog, an audience and an interval. Once started
//! it sends one message per interval, walking the catalog in order or in a
//! fresh random order per cycle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use automessages::broadcast::BroadcastGroup;
//! use automessages::host::memory::MemoryProxy;
//! use automessages::scheduler::Scheduler;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = Arc::new(MemoryProxy::new().with_servers(["lobby1", "lobby2"]));
//! let mut group = BroadcastGroup::new(
//!     "lobby",
//!     proxy,
//!     &["lobby{1-2}"],
//!     60,
//!     false,
//!     ["&aWelcome %player%!", "&eVisit our store"],
//! );
//! group.start(&Scheduler::current()?)?;
//! # Ok(())
//! # }
//! ```

mod audience;
mod error;
mod group;
mod message;
mod rotation;

pub use audience::{
    is_global, Audience, RangeError, ServerRange, GLOBAL, MAX_RANGE_BOUND, MAX_RANGE_SPAN,
};
pub use error::StartError;
pub use group::{BroadcastGroup, Delivery};
pub use message::{
    substitute, Message, MessageCatalog, MessageFormat, Rendering, NO_SERVER,
    PLAYER_PLACEHOLDER, SERVER_PLACEHOLDER,
};
pub use rotation::Rotation;
