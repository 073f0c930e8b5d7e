//! In-process game store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use pebble_rules::GameState;
use tracing::{debug, info, instrument, warn};

use super::{GameStore, StoreError, StoredGame};

/// Game store backed by a mutex-guarded map.
///
/// Clones share the same map. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    games: Arc<Mutex<HashMap<String, StoredGame>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory game store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredGame>>, StoreError> {
        self.games
            .lock()
            .map_err(|_| StoreError::Unavailable("game map lock poisoned".to_string()))
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    #[instrument(skip(self, state), fields(game_id = %state.id()))]
    async fn insert(&self, state: GameState) -> Result<StoredGame, StoreError> {
        let mut games = self.lock()?;
        if games.contains_key(state.id()) {
            warn!("Game id already taken");
            return Err(StoreError::AlreadyExists(state.id().to_string()));
        }
        let stored = StoredGame::first(state, Utc::now());
        games.insert(stored.state().id().to_string(), stored.clone());
        debug!(games = games.len(), "Game stored");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn load(&self, game_id: &str) -> Result<Option<StoredGame>, StoreError> {
        Ok(self.lock()?.get(game_id).cloned())
    }

    #[instrument(skip(self, state), fields(game_id = %state.id()))]
    async fn replace(
        &self,
        expected_version: i64,
        state: GameState,
    ) -> Result<StoredGame, StoreError> {
        let mut games = self.lock()?;
        let current = games
            .get(state.id())
            .ok_or_else(|| StoreError::NotFound(state.id().to_string()))?;

        if *current.version() != expected_version {
            warn!(
                expected = expected_version,
                actual = current.version(),
                "Stale write rejected"
            );
            return Err(StoreError::Conflict {
                id: state.id().to_string(),
                expected: expected_version,
                actual: *current.version(),
            });
        }

        let next = current.successor(state, Utc::now());
        games.insert(next.state().id().to_string(), next.clone());
        debug!(version = next.version(), "Game replaced");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<StoredGame>, StoreError> {
        let mut games: Vec<StoredGame> = self.lock()?.values().cloned().collect();
        games.sort_by(|a, b| {
            a.created_at()
                .cmp(b.created_at())
                .then_with(|| a.state().id().cmp(b.state().id()))
        });
        Ok(games)
    }
}
