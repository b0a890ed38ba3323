//! Integration tests for the supervisor
//!
//! Covers delayed startup, reload, shutdown and skipping of groups that
//! fail validation, all on a paused tokio clock.

mod common;

use automessages::scheduler::Scheduler;
use automessages::supervisor::{Supervisor, STARTUP_DELAY};
use common::{advance_secs, lobby_proxy, write_config};
use std::time::Duration;

const SINGLE_GROUP: &str = r#"
[a]
servers = ["global"]
interval = 5
messages = ["A"]
"#;

#[tokio::test(start_paused = true)]
async fn test_delayed_startup() {
    let proxy = lobby_proxy();
    let file = write_config(SINGLE_GROUP);
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());

    assert_eq!(supervisor.enable(false, Some(STARTUP_DELAY)).unwrap(), 1);

    advance_secs(2.5).await;
    assert!(supervisor.running_groups().is_empty());
    assert!(supervisor.is_pending());

    advance_secs(1.0).await;
    assert_eq!(supervisor.running_groups(), vec!["a"]);
    assert!(!supervisor.is_pending());

    // first message one interval after the groups started
    advance_secs(4.0).await;
    assert!(proxy.broadcasts().is_empty());
    advance_secs(1.0).await;
    assert_eq!(proxy.broadcasts_plain(), vec!["A"]);
}

#[tokio::test(start_paused = true)]
async fn test_reload_replaces_groups() {
    let proxy = lobby_proxy();
    let file = write_config(SINGLE_GROUP);
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());
    supervisor.enable(false, None).unwrap();

    advance_secs(5.5).await;
    assert_eq!(proxy.broadcasts_plain(), vec!["A"]);

    std::fs::write(
        file.path(),
        "[b]\nservers = [\"global\"]\ninterval = 5\nmessages = [\"B\"]\n",
    )
    .unwrap();
    assert_eq!(supervisor.reload().unwrap(), 1);
    assert_eq!(supervisor.running_groups(), vec!["b"]);

    advance_secs(5.5).await;
    assert_eq!(proxy.broadcasts_plain(), vec!["A", "B"]);
}

#[tokio::test(start_paused = true)]
async fn test_reload_cancels_pending_startup() {
    let proxy = lobby_proxy();
    let file = write_config(SINGLE_GROUP);
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());

    supervisor.enable(false, Some(STARTUP_DELAY)).unwrap();
    advance_secs(1.0).await;
    supervisor.reload().unwrap();
    assert!(!supervisor.is_pending());

    // the reloaded group started at t=1 and ticks at t=6; nothing from the
    // cancelled startup runs alongside it
    advance_secs(5.5).await;
    assert_eq!(supervisor.running_groups(), vec!["a"]);
    assert_eq!(proxy.broadcasts_plain(), vec!["A"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_groups_are_skipped() {
    let proxy = lobby_proxy();
    let file = write_config(
        r#"
[ok]
servers = ["lobby{1-2}"]
interval = 10
messages = ["Lobby tip"]

[no_servers]
servers = ["creative"]
interval = 10
messages = ["x"]

[no_interval]
servers = ["global"]
interval = 0
messages = ["x"]

[no_messages]
servers = ["global"]
interval = 10

[broken]
servers = "lobby1"
"#,
    );
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());

    assert_eq!(supervisor.enable(false, None).unwrap(), 5);
    assert_eq!(supervisor.running_groups(), vec!["ok"]);

    advance_secs(10.5).await;
    assert_eq!(common::received(&proxy, "alice"), vec!["Lobby tip"]);
    assert!(proxy.broadcasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_everything() {
    let proxy = lobby_proxy();
    let file = write_config(SINGLE_GROUP);
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());
    supervisor.enable(false, None).unwrap();

    advance_secs(5.5).await;
    supervisor.shutdown();
    assert!(supervisor.running_groups().is_empty());

    advance_secs(60.0).await;
    assert_eq!(proxy.broadcasts_plain(), vec!["A"]);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_config_keeps_previous_groups() {
    let proxy = lobby_proxy();
    let file = write_config(SINGLE_GROUP);
    let supervisor = Supervisor::new(proxy.clone(), file.path(), Scheduler::current().unwrap());
    supervisor.enable(false, None).unwrap();

    std::fs::write(file.path(), "[a]\ninterval = ").unwrap();
    assert!(supervisor.reload().is_err());
    assert_eq!(supervisor.running_groups(), vec!["a"]);

    advance_secs(5.5).await;
    assert_eq!(proxy.broadcasts_plain(), vec!["A"]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_config_is_bootstrapped() {
    let proxy = lobby_proxy();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plugins").join("automessages").join("config.toml");
    let supervisor = Supervisor::new(proxy.clone(), &path, Scheduler::current().unwrap());

    assert_eq!(supervisor.enable(false, None).unwrap(), 2);
    assert!(path.exists());
    assert_eq!(supervisor.running_groups(), vec!["lobby", "global"]);

    supervisor.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;
}
