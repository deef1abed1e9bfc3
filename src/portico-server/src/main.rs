//! Portico gateway binary.

use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use portico_server::{ServerConfig, run_with_shutdown};

/// Portico chat gateway
#[derive(Parser)]
#[command(name = "portico-server")]
#[command(about = "Chat-session gateway in front of the inference service")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Upstream service base URL
    #[arg(short, long)]
    upstream: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_level, args.json_logs);

    let config = if let Some(config_path) = args.config {
        match ServerConfig::load(&config_path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load config from {}: {}", config_path, e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let mut config = match ServerConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load config from environment: {}", e);
                return ExitCode::FAILURE;
            }
        };
        config.listen_addr = args.listen;
        if let Some(upstream) = args.upstream {
            config.upstream.base_url = upstream;
        }
        config
    };

    info!("Starting Portico gateway on {}", config.listen_addr);
    info!("Press Ctrl+C to stop");

    // Create shutdown signal
    let shutdown = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }
    };

    if let Err(e) = run_with_shutdown(config, shutdown).await {
        error!("Gateway error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Gateway stopped");
    ExitCode::SUCCESS
}
