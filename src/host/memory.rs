//! In-memory proxy host
//!
//! Keeps a registry of servers and players in process. Every delivery is
//! logged as legacy text, which is what the CLI's `run` command shows. Only
//! a proxy built with [`MemoryProxy::recording`] also keeps the delivered
//! components for inspection.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BackendServer, Player, Proxy, ServerLookup};
use crate::text::legacy::AMPERSAND;
use crate::text::Component;

type PlayerList = Arc<RwLock<Vec<Arc<MemoryPlayer>>>>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Player
// ============================================================================

/// A player held by [`MemoryProxy`]
#[derive(Debug)]
pub struct MemoryPlayer {
    username: String,
    server: RwLock<Option<String>>,
    inbox: Option<Mutex<Vec<Component>>>,
}

impl MemoryPlayer {
    fn new(username: impl Into<String>, server: Option<String>, record: bool) -> Self {
        Self {
            username: username.into(),
            server: RwLock::new(server),
            inbox: record.then(|| Mutex::new(Vec::new())),
        }
    }

    /// Move the player to another server, `None` while switching
    pub fn move_to(&self, server: Option<&str>) {
        *write(&self.server) = server.map(str::to_string);
    }

    /// Messages delivered to this player so far, always empty unless the
    /// proxy records deliveries
    pub fn received(&self) -> Vec<Component> {
        self.inbox
            .as_ref()
            .map(|inbox| lock(inbox).clone())
            .unwrap_or_default()
    }

    /// Plain text of the messages delivered so far
    pub fn received_plain(&self) -> Vec<String> {
        self.received().iter().map(Component::to_plain).collect()
    }

    /// Forget delivered messages
    pub fn clear(&self) {
        if let Some(inbox) = &self.inbox {
            lock(inbox).clear();
        }
    }
}

impl Player for MemoryPlayer {
    fn username(&self) -> &str {
        &self.username
    }

    fn current_server(&self) -> Option<String> {
        read(&self.server).clone()
    }

    fn send_message(&self, message: &Component) {
        tracing::info!(
            player = %self.username,
            message = %message.to_legacy(AMPERSAND),
            "Delivered message"
        );
        if let Some(inbox) = &self.inbox {
            lock(inbox).push(message.clone());
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// A backend server registered with [`MemoryProxy`]
#[derive(Debug)]
pub struct MemoryServer {
    name: String,
    players: PlayerList,
}

impl BackendServer for MemoryServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn connected_players(&self) -> Vec<Arc<dyn Player>> {
        read(&self.players)
            .iter()
            .filter(|p| p.current_server().as_deref() == Some(self.name.as_str()))
            .map(|p| Arc::clone(p) as Arc<dyn Player>)
            .collect()
    }
}

// ============================================================================
// Proxy
// ============================================================================

/// In-process proxy with a mutable server and player registry
#[derive(Debug, Default)]
pub struct MemoryProxy {
    servers: RwLock<Vec<Arc<MemoryServer>>>,
    players: PlayerList,
    broadcasts: Option<Mutex<Vec<Component>>>,
}

impl MemoryProxy {
    /// Create an empty proxy that only logs deliveries
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty proxy that keeps every delivered component
    pub fn recording() -> Self {
        Self {
            broadcasts: Some(Mutex::new(Vec::new())),
            ..Self::default()
        }
    }

    /// Register the given servers, in order
    pub fn with_servers<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register_server(name);
        }
        self
    }

    /// True when delivered components are kept
    pub fn is_recording(&self) -> bool {
        self.broadcasts.is_some()
    }

    /// Register a server, returning the existing one if the name is taken
    pub fn register_server(&self, name: impl Into<String>) -> Arc<MemoryServer> {
        let name = name.into();
        let mut servers = write(&self.servers);
        if let Some(existing) = servers.iter().find(|s| s.name == name) {
            return Arc::clone(existing);
        }
        let server = Arc::new(MemoryServer {
            name,
            players: Arc::clone(&self.players),
        });
        servers.push(Arc::clone(&server));
        server
    }

    /// Names of all registered servers, in registration order
    pub fn server_names(&self) -> Vec<String> {
        read(&self.servers).iter().map(|s| s.name.clone()).collect()
    }

    /// Connect a player, optionally already on a backend server
    pub fn connect(&self, username: impl Into<String>, server: Option<&str>) -> Arc<MemoryPlayer> {
        let player = Arc::new(MemoryPlayer::new(
            username,
            server.map(str::to_string),
            self.is_recording(),
        ));
        write(&self.players).push(Arc::clone(&player));
        player
    }

    /// Disconnect a player by username
    pub fn disconnect(&self, username: &str) {
        write(&self.players).retain(|p| p.username != username);
    }

    /// Look a connected player up by username
    pub fn player(&self, username: &str) -> Option<Arc<MemoryPlayer>> {
        read(&self.players)
            .iter()
            .find(|p| p.username == username)
            .cloned()
    }

    /// Proxy-wide broadcasts sent so far
    pub fn broadcasts(&self) -> Vec<Component> {
        self.broadcasts
            .as_ref()
            .map(|sent| lock(sent).clone())
            .unwrap_or_default()
    }

    /// Plain text of the proxy-wide broadcasts sent so far
    pub fn broadcasts_plain(&self) -> Vec<String> {
        self.broadcasts().iter().map(Component::to_plain).collect()
    }
}

impl ServerLookup for MemoryProxy {
    fn server(&self, name: &str) -> Option<Arc<dyn BackendServer>> {
        read(&self.servers)
            .iter()
            .find(|s| s.name == name)
            .map(|s| Arc::clone(s) as Arc<dyn BackendServer>)
    }
}

impl Proxy for MemoryProxy {
    fn all_players(&self) -> Vec<Arc<dyn Player>> {
        read(&self.players)
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn Player>)
            .collect()
    }

    fn broadcast(&self, message: &Component) {
        tracing::info!(message = %message.to_legacy(AMPERSAND), "Broadcast message");
        if let Some(sent) = &self.broadcasts {
            lock(sent).push(message.clone());
        }
    }
}
