//! Database models for game snapshots.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::store::StoredGame;

/// One row of the `games` table: a versioned JSON snapshot of a game.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Getters, new)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: String,
    version: i64,
    status: String,
    snapshot: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRecord {
    /// Encodes a stored game as a row.
    #[instrument(skip(game), fields(game_id = %game.state().id(), version = game.version()))]
    pub fn from_stored(game: &StoredGame) -> Result<Self, DbError> {
        let snapshot = serde_json::to_string(game.state())?;
        Ok(Self::new(
            game.state().id().to_string(),
            *game.version(),
            game.state().status().to_string(),
            snapshot,
            game.created_at().naive_utc(),
            game.updated_at().naive_utc(),
        ))
    }

    /// Decodes the row back into a stored game.
    #[instrument(skip(self), fields(game_id = %self.id, version = self.version))]
    pub fn into_stored(self) -> Result<StoredGame, DbError> {
        let state = serde_json::from_str(&self.snapshot)
            .map_err(|e| DbError::corrupt_snapshot(&self.id, e))?;
        Ok(StoredGame::new(
            state,
            self.version,
            self.created_at.and_utc(),
            self.updated_at.and_utc(),
        ))
    }
}
