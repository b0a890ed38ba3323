use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use automessages::config::DEFAULT_CONFIG_FILE;
use commands::{check, run, RunParams};

#[derive(Parser)]
#[command(
    name = "automessages",
    version,
    about = "Rotating auto-broadcast scheduler for game server proxies",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the broadcast groups against an in-memory proxy
    Run {
        /// Configuration file, created with defaults when missing
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Backend servers to register (defaults to every server the config names)
        #[arg(short, long, value_delimiter = ',')]
        servers: Vec<String>,

        /// Connected player as name@server, or just name while between servers
        #[arg(short, long = "player")]
        players: Vec<String>,

        /// Seconds to wait before starting the groups
        #[arg(long, default_value = "3")]
        startup_delay: u64,
    },

    /// Validate the configuration without starting any timers
    Check {
        /// Configuration file, created with defaults when missing
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Backend servers to register (defaults to every server the config names)
        #[arg(short, long, value_delimiter = ',')]
        servers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Run {
            config,
            servers,
            players,
            startup_delay,
        } => {
            tracing::info!(
                config = %config.display(),
                servers = ?servers,
                players = players.len(),
                startup_delay = %startup_delay,
                "Starting run command"
            );
            run(RunParams {
                config,
                servers,
                players,
                startup_delay,
            })
            .await?;
        }

        Commands::Check { config, servers } => {
            tracing::debug!(config = %config.display(), "Starting check command");
            check(&config, &servers)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("automessages=trace,info")
    } else {
        tracing_subscriber::EnvFilter::new("automessages=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
