//! Versioned game storage.
//!
//! A [`GameStore`] maps game ids to [`StoredGame`] snapshots. Writes after
//! the first are conditional on the version the writer last read, which is
//! how concurrent requests against one game are serialized.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use pebble_rules::GameState;
use serde::{Deserialize, Serialize};

use crate::db::DbError;

/// Version assigned to a game when it is first stored.
pub const INITIAL_VERSION: i64 = 1;

/// A game snapshot together with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    /// Current state of the game.
    state: GameState,
    /// Bumped by one on every successful write.
    version: i64,
    /// When the game was first stored.
    created_at: DateTime<Utc>,
    /// When the game was last written.
    updated_at: DateTime<Utc>,
}

impl StoredGame {
    /// Consumes the record, returning the game state.
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// A fresh record at [`INITIAL_VERSION`].
    pub(crate) fn first(state: GameState, now: DateTime<Utc>) -> Self {
        Self::new(state, INITIAL_VERSION, now, now)
    }

    /// The record that replaces this one after a successful write.
    pub(crate) fn successor(&self, state: GameState, now: DateTime<Utc>) -> Self {
        Self::new(state, self.version + 1, self.created_at, now)
    }
}

/// Error raised by a [`GameStore`].
#[derive(Debug, Clone, Display, Error)]
pub enum StoreError {
    /// No game with this id.
    #[display("Game {} not found", _0)]
    NotFound(#[error(not(source))] String),

    /// A game with this id already exists.
    #[display("Game {} already exists", _0)]
    AlreadyExists(#[error(not(source))] String),

    /// The stored version moved on since the writer read it.
    #[display(
        "Game {} was changed by another request (expected version {}, found {})",
        id,
        expected,
        actual
    )]
    Conflict {
        /// Game id.
        id: String,
        /// Version the writer read.
        expected: i64,
        /// Version currently stored.
        actual: i64,
    },

    /// The storage backend failed.
    #[display("Storage backend failed: {}", _0)]
    Backend(DbError),

    /// The storage backend could not be reached.
    #[display("Storage unavailable: {}", _0)]
    Unavailable(#[error(not(source))] String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Backend(err)
    }
}

/// Persistence seam for games.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Stores a new game at [`INITIAL_VERSION`].
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the id is taken.
    async fn insert(&self, state: GameState) -> Result<StoredGame, StoreError>;

    /// Loads a game by id. Returns `None` if not found.
    async fn load(&self, game_id: &str) -> Result<Option<StoredGame>, StoreError>;

    /// Overwrites the game with the same id as `state`, provided its stored
    /// version is still `expected_version`. On success the version is bumped
    /// by one.
    ///
    /// Fails with [`StoreError::Conflict`] if another write got there first,
    /// or [`StoreError::NotFound`] if the game does not exist.
    async fn replace(
        &self,
        expected_version: i64,
        state: GameState,
    ) -> Result<StoredGame, StoreError>;

    /// Lists every stored game, oldest first.
    async fn list(&self) -> Result<Vec<StoredGame>, StoreError>;
}
