pub mod check;
pub mod run;

// Re-export command functions for convenience
pub use check::check;
pub use run::{run, RunParams};

use anyhow::{bail, Result};
use std::sync::Arc;

use automessages::broadcast::{ServerRange, GLOBAL};
use automessages::config::AutoMessagesConfig;
use automessages::host::memory::MemoryProxy;

/// Build the in-memory proxy the commands run against
///
/// Without explicit `servers`, every concrete server name the configuration
/// mentions is registered, ranges expanded.
pub fn build_proxy(
    config: &AutoMessagesConfig,
    servers: &[String],
    players: &[String],
) -> Result<Arc<MemoryProxy>> {
    let proxy = if servers.is_empty() {
        MemoryProxy::new().with_servers(configured_servers(config))
    } else {
        MemoryProxy::new()
            .with_servers(servers.iter().map(|s| s.trim()).filter(|s| !s.is_empty()))
    };

    for entry in players {
        let (name, server) = match entry.split_once('@') {
            Some((name, server)) => (name, Some(server)),
            None => (entry.as_str(), None),
        };
        if name.is_empty() {
            bail!("Invalid player '{entry}', expected name@server or name");
        }
        proxy.connect(name, server.filter(|s| !s.is_empty()));
    }

    tracing::debug!(
        servers = ?proxy.server_names(),
        players = players.len(),
        "In-memory proxy ready"
    );
    Ok(Arc::new(proxy))
}

fn configured_servers(config: &AutoMessagesConfig) -> Vec<String> {
    config
        .groups()
        .iter()
        .flat_map(|(_, group)| group.servers.iter())
        .filter(|entry| !entry.eq_ignore_ascii_case(GLOBAL))
        .flat_map(|entry| match ServerRange::parse(entry) {
            Some(Ok(range)) => range.names().collect(),
            // already reported as an invalid section
            Some(Err(_)) => Vec::new(),
            None => vec![entry.clone()],
        })
        .collect()
}
