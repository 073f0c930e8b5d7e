//! Pebble Pits - Unified CLI
//!
//! Serves the HTTP API or plays a local game in the terminal.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use pebble_pits::{
    GameService, GameStore, MemoryStore, ServerConfig, SqliteStore, build_oracle, play, serve,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database,
        } => {
            init_tracing("info,pebble_pits=debug");
            let config = match config {
                Some(path) => ServerConfig::from_file(path)?,
                None => ServerConfig::default(),
            };
            run_server(config.with_overrides(host, port, database)).await
        }
        Command::Play { player } => {
            // Keep the board readable: only warnings reach the terminal.
            init_tracing("warn");
            let game = play::run_stdio(&player).await?;
            info!(status = %game.status(), "Local game finished");
            Ok(())
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` or `default_filter`.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Run the HTTP game server
#[instrument(skip(config), fields(addr = %config.bind_address()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting Pebble Pits server");

    let store: Arc<dyn GameStore> = match config.database() {
        Some(path) => {
            info!(database = %path, "Using SQLite store");
            Arc::new(SqliteStore::open(path.clone())?)
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let oracle = build_oracle(config.oracle())?;
    let service = GameService::new(store, oracle, *config.event_capacity());

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    serve(listener, service).await?;

    info!("Server stopped");
    Ok(())
}
