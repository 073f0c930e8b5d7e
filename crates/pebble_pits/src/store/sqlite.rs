//! SQLite-backed game store.

use async_trait::async_trait;
use chrono::Utc;
use pebble_rules::GameState;
use tracing::{info, instrument, warn};

use super::{GameStore, StoreError, StoredGame};
use crate::db::{DbError, GameRecord, GameRepository};

/// Game store that persists snapshots through [`GameRepository`].
///
/// Diesel's SQLite connection is synchronous, so each call runs on tokio's
/// blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    repo: GameRepository,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = GameRepository::open(db_path)?;
        info!("SQLite game store ready");
        Ok(Self { repo })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&GameRepository) -> Result<T, StoreError> + Send + 'static,
    {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || work(&repo))
            .await
            .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl GameStore for SqliteStore {
    #[instrument(skip(self, state), fields(game_id = %state.id()))]
    async fn insert(&self, state: GameState) -> Result<StoredGame, StoreError> {
        self.blocking(move |repo| {
            let stored = StoredGame::first(state, Utc::now());
            let record = GameRecord::from_stored(&stored)?;
            if repo.insert_game(&record)? {
                Ok(stored)
            } else {
                warn!("Game id already taken");
                Err(StoreError::AlreadyExists(record.id().clone()))
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn load(&self, game_id: &str) -> Result<Option<StoredGame>, StoreError> {
        let game_id = game_id.to_string();
        self.blocking(move |repo| match repo.find_game(&game_id)? {
            Some(record) => Ok(Some(record.into_stored()?)),
            None => Ok(None),
        })
        .await
    }

    #[instrument(skip(self, state), fields(game_id = %state.id()))]
    async fn replace(
        &self,
        expected_version: i64,
        state: GameState,
    ) -> Result<StoredGame, StoreError> {
        self.blocking(move |repo| {
            let game_id = state.id().to_string();
            let current = repo
                .find_game(&game_id)?
                .ok_or_else(|| StoreError::NotFound(game_id.clone()))?
                .into_stored()?;

            let next = StoredGame::new(
                state,
                expected_version + 1,
                *current.created_at(),
                Utc::now(),
            );
            let record = GameRecord::from_stored(&next)?;
            if repo.update_game_if_version(&record, expected_version)? {
                return Ok(next);
            }

            // The version guard rejected the write; report what is there now.
            let actual = match repo.find_game(&game_id)? {
                Some(row) => *row.version(),
                None => return Err(StoreError::NotFound(game_id)),
            };
            warn!(expected = expected_version, actual, "Stale write rejected");
            Err(StoreError::Conflict {
                id: game_id,
                expected: expected_version,
                actual,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<StoredGame>, StoreError> {
        self.blocking(|repo| {
            repo.list_games()?
                .into_iter()
                .map(|record| record.into_stored().map_err(StoreError::from))
                .collect()
        })
        .await
    }
}
