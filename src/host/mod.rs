//! Proxy host abstraction
//!
//! The broadcaster never talks to sockets. Everything it needs from the
//! proxy is expressed by the traits in this module: looking servers up by
//! name, enumerating players, and handing a rendered [`Component`] to the
//! proxy's connection layer.
//!
//! [`memory`] provides an in-process implementation used by the CLI and the
//! test suite.

pub mod memory;

use std::sync::Arc;

use crate::text::Component;

/// A connected player
pub trait Player: Send + Sync {
    /// Username shown for `%player%`
    fn username(&self) -> &str;

    /// Name of the backend server the player is currently on, if any
    fn current_server(&self) -> Option<String>;

    /// Hand a message to the player's connection
    fn send_message(&self, message: &Component);
}

/// A backend server registered with the proxy
pub trait BackendServer: Send + Sync {
    /// Registered server name
    fn name(&self) -> &str;

    /// Players currently connected to this server, in host order
    fn connected_players(&self) -> Vec<Arc<dyn Player>>;
}

/// Server registry lookup
pub trait ServerLookup: Send + Sync {
    /// Find a registered server by exact name
    fn server(&self, name: &str) -> Option<Arc<dyn BackendServer>>;
}

/// The proxy as seen by a broadcast group
pub trait Proxy: ServerLookup {
    /// Every player connected to the proxy, in host order
    fn all_players(&self) -> Vec<Arc<dyn Player>>;

    /// Send one message to everyone on the proxy
    fn broadcast(&self, message: &Component);
}
