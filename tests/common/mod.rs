//! Common test utilities

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use automessages::host::memory::MemoryProxy;
use tempfile::NamedTempFile;

/// Proxy with lobby1-3, survival and hub registered and a few players
///
/// alice and carol are on lobby1 and lobby2, bob on survival, dave is
/// between servers.
#[allow(dead_code)]
pub fn lobby_proxy() -> Arc<MemoryProxy> {
    let proxy =
        MemoryProxy::recording().with_servers(["lobby1", "lobby2", "lobby3", "survival", "hub"]);
    proxy.connect("alice", Some("lobby1"));
    proxy.connect("bob", Some("survival"));
    proxy.connect("carol", Some("lobby2"));
    proxy.connect("dave", None);
    Arc::new(proxy)
}

/// Write a config file to a temporary location
#[allow(dead_code)]
pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

/// Sleep in paused test time
#[allow(dead_code)]
pub async fn advance_secs(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

/// Plain text received by a player
#[allow(dead_code)]
pub fn received(proxy: &MemoryProxy, username: &str) -> Vec<String> {
    proxy
        .player(username)
        .map(|p| p.received_plain())
        .unwrap_or_default()
}
