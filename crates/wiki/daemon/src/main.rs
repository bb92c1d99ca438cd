//! wikid - Wiki approval workflow daemon
//!
//! Serves the approval workflow REST API and streams workflow events.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiki_daemon::error::{DaemonError, DaemonResult};
use wiki_daemon::{DaemonConfig, Server};

/// Wiki workflow daemon CLI
#[derive(Parser)]
#[command(name = "wikid")]
#[command(about = "Wiki approval workflow daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WIKI_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "WIKI_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "WIKI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "WIKI_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())?;

    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "Starting wikid"
    );

    let server = Server::new(config)?;
    server.run().await
}
