//! Pebble Pits game server.
//!
//! Wraps the [`pebble_rules`] engine in a service that stores games,
//! consults a legality oracle before each move and publishes every change:
//!
//! - **Oracle**: [`LegalityOracle`] with local and remote implementations
//! - **Store**: [`GameStore`] with in-memory and SQLite backends
//! - **Service**: [`GameService`], the create / join / move / reset operations
//! - **Server**: the JSON HTTP API built on axum
//! - **Play**: a terminal hot-seat game

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod oracle;
pub mod play;
mod server;
mod service;
mod store;

pub use config::{ConfigError, OracleConfig, ServerConfig};
pub use db::{DbError, DbErrorKind, GameRecord, GameRepository};
pub use oracle::{LegalityOracle, OracleError, RemoteOracle, RulesOracle, Verdict, build_oracle};
pub use server::{
    ApiError, CreateGameRequest, JoinGameRequest, MoveRequest, ResetRequest, router, serve,
};
pub use service::{
    CreateOptions, GameEvent, GameService, MoveReceipt, ServiceError, UNEXPLAINED_REFUSAL,
};
pub use store::{GameStore, INITIAL_VERSION, MemoryStore, SqliteStore, StoreError, StoredGame};
