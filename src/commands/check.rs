use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use automessages::broadcast::{BroadcastGroup, Rendering};
use automessages::config;
use automessages::host::Proxy;

use super::build_proxy;

/// Print every group's start outcome without starting timers
pub fn check(path: &Path, servers: &[String]) -> Result<()> {
    let loaded = config::load(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let proxy: Arc<dyn Proxy> = build_proxy(&loaded, servers, &[])?;

    println!("Checking {}", path.display());
    println!("================================");

    for error in loaded.invalid() {
        println!("[fail] {error}");
    }

    let mut ready = 0;
    for (name, section) in loaded.groups() {
        let group = BroadcastGroup::from_config(name.clone(), Arc::clone(&proxy), section);
        match group.validate() {
            Ok(interval) => {
                ready += 1;
                let per_recipient = group
                    .catalog()
                    .iter()
                    .filter(|m| matches!(m.rendering(), Rendering::PerRecipient))
                    .count();
                let structured = group.catalog().iter().filter(|m| m.is_structured()).count();
                println!(
                    "[ok]   {name}: {} message(s), {} per-recipient, {} structured, every {}s to {}{}",
                    group.catalog().len(),
                    per_recipient,
                    structured,
                    interval.as_secs(),
                    group.audience(),
                    if group.shuffle() { ", shuffled" } else { "" }
                );
            }
            Err(reason) => println!("[skip] {name}: {reason}"),
        }
    }

    println!();
    println!("{ready} of {} group(s) would start", loaded.len());
    Ok(())
}
