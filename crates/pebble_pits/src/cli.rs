//! Command-line interface for pebble_pits.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pebble Pits - twelve-pit sowing game server
#[derive(Parser, Debug)]
#[command(name = "pebble_pits")]
#[command(about = "Rules engine and game server for Pebble Pits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (overrides config; in-memory when unset)
        #[arg(long)]
        database: Option<String>,
    },

    /// Play a local game in the terminal
    Play {
        /// Your display name
        #[arg(long, default_value = "Player 1")]
        player: String,
    },
}
