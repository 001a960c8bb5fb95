//! Transaction ingestion service CLI server
//!
//! ```sh
//! # Run with default config (~/.config/txn-ingest/config.toml)
//! txn-ingest
//!
//! # Custom config path
//! txn-ingest --config /etc/txn-ingest/config.toml
//!
//! # Override the listen address
//! txn-ingest --host 127.0.0.1 --port 9090
//!
//! # Validate config without starting
//! txn-ingest --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use txn_ingest::config::AppConfig;
use txn_ingest::server::{init_tracing, ServerHandle, ServerOptions};

/// Validated transaction ingestion over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "txn-ingest",
    version,
    about = "Validated transaction ingestion service",
    long_about = "Accepts purchase transactions as JSON on POST /api/v1/transactions, \
                  validates them and stores the valid ones.\n\n\
                  Default config: ~/.config/txn-ingest/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TXN_INGEST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let explicit_path = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(txn_ingest::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // The log level override has to land before the subscriber is built.
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        // No file at the default location just means "all defaults".
        Some(e) if !explicit_path && e.is_not_found() => info!(
            "No config file at {}, using default configuration",
            config_path.display()
        ),
        Some(e) => {
            if cli.check {
                eprintln!("Configuration is invalid: {}", e);
                return Err(e.into());
            }
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    if let Some(host) = cli.host {
        info!("CLI override: host = {}", host);
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file   : {}", config_path.display());
        println!("   API address   : {}", config.server.address());
        println!("   Max body      : {} bytes", config.server.max_body_bytes);
        println!(
            "   Store capacity: {}",
            config
                .storage
                .capacity
                .map_or_else(|| "unbounded".to_string(), |c| c.to_string())
        );
        println!("   Metrics       : {}", config.metrics.enabled);
        println!("   Log level     : {}", config.logging.level);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions { config }).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
