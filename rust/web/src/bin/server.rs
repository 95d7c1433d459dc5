//! Standalone hand server binary
//!
//! Usage: cargo run -p holdem_web --bin holdem-web-server -- --port 8080

use std::path::PathBuf;

use clap::Parser;
use holdem_web::config::{self, Overrides, CONFIG_ENV};
use holdem_web::logging::{init_logging, LogFormat};
use holdem_web::WebServer;

#[derive(Debug, Parser)]
#[command(name = "holdem-web-server", about = "Texas Hold'em hand server", version)]
struct Args {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,
    /// Port to bind to
    #[arg(long, short = 'p')]
    port: Option<u16>,
    /// Base seed for reproducible deals
    #[arg(long)]
    seed: Option<u64>,
    /// SQLite file for finished hands (in memory when omitted)
    #[arg(long)]
    database: Option<PathBuf>,
    /// TOML config file; same as setting HOLDEM_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    if let Some(path) = &args.config {
        std::env::set_var(CONFIG_ENV, path);
    }
    let resolved = config::load_with_sources()?.apply(Overrides {
        host: args.host,
        port: args.port,
        seed: args.seed,
        database: args.database,
    })?;

    let cfg = &resolved.config;
    tracing::info!(
        host = %cfg.server.host,
        host_source = ?resolved.sources.host,
        port = cfg.server.port,
        port_source = ?resolved.sources.port,
        seed = ?cfg.table.seed,
        database = ?cfg.archive.database,
        "starting hand server"
    );

    let server = WebServer::new(resolved.config)?;
    let handle = server.start().await?;
    tracing::info!("server running at http://{}", handle.address());

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down server");
    handle.shutdown().await?;
    tracing::info!("server stopped cleanly");
    Ok(())
}
