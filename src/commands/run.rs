use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use automessages::config;
use automessages::metrics;
use automessages::supervisor::Supervisor;

use super::build_proxy;

/// Parameters for the run command
#[derive(Debug, Clone)]
pub struct RunParams {
    pub config: PathBuf,
    pub servers: Vec<String>,
    pub players: Vec<String>,
    pub startup_delay: u64,
}

/// Run the supervisor until Ctrl-C, reloading on SIGHUP
pub async fn run(params: RunParams) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    let loaded = config::load(&params.config)
        .with_context(|| format!("Failed to load config: {}", params.config.display()))?;
    let proxy = build_proxy(&loaded, &params.servers, &params.players)?;

    let supervisor = Supervisor::current(proxy, &params.config)?;

    let delay = (params.startup_delay > 0).then(|| Duration::from_secs(params.startup_delay));
    supervisor
        .enable(false, delay)
        .context("Failed to start automessages")?;

    wait_for_shutdown(&supervisor).await?;
    supervisor.shutdown();

    match metrics::encode_metrics() {
        Ok(text) => tracing::debug!(metrics = %text, "Final metrics"),
        Err(e) => tracing::debug!(error = %e, "Failed to encode metrics"),
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown(supervisor: &Supervisor) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Received Ctrl-C, shutting down");
                return Ok(());
            }
            _ = hangup.recv() => {
                tracing::info!("Received SIGHUP");
                if let Err(e) = supervisor.reload() {
                    tracing::warn!(
                        error = %e,
                        category = %e.category(),
                        "Reload failed, keeping current groups"
                    );
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_supervisor: &Supervisor) -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Received Ctrl-C, shutting down");
    Ok(())
}
