//! Errors raised by the SQLite snapshot store.

use derive_more::{Display, Error};
use tracing::warn;

/// Which step of a snapshot store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The database path is unusable.
    #[display("path")]
    Path,
    /// The database file could not be opened.
    #[display("connection")]
    Connection,
    /// The `games` table could not be created or upgraded.
    #[display("migration")]
    Migration,
    /// A statement against the `games` table failed.
    #[display("query")]
    Query,
    /// A game snapshot could not be encoded or decoded.
    #[display("snapshot")]
    Snapshot,
}

/// Snapshot store failure, with the source location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Game store {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failed step.
    pub kind: DbErrorKind,
    /// What went wrong.
    pub message: String,
    /// Line that raised the error.
    pub line: u32,
    /// File that raised the error.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error located at the caller.
    #[track_caller]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The database path was blank.
    #[track_caller]
    pub fn empty_path() -> Self {
        Self::new(DbErrorKind::Path, "database path is empty")
    }

    /// The database at `path` could not be opened.
    #[track_caller]
    pub fn connect(path: &str, err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, format!("cannot open '{}': {}", path, err))
    }

    /// Pending migrations could not be applied.
    #[track_caller]
    pub fn migration(err: impl std::fmt::Display) -> Self {
        Self::new(DbErrorKind::Migration, format!("cannot apply migrations: {}", err))
    }

    /// The stored snapshot of `game_id` is not a readable game.
    #[track_caller]
    pub fn corrupt_snapshot(game_id: &str, err: serde_json::Error) -> Self {
        warn!(game_id, error = %err, "Unreadable game snapshot");
        Self::new(
            DbErrorKind::Snapshot,
            format!("snapshot of game {} is unreadable: {}", game_id, err),
        )
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(DbErrorKind::Snapshot, format!("cannot encode snapshot: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_points_at_caller() {
        let err = DbError::empty_path();
        assert_eq!(err.kind, DbErrorKind::Path);
        assert!(err.file.ends_with("error.rs"));
        assert_eq!(err.line, line!() - 3);
    }

    #[test]
    fn test_corrupt_snapshot_names_the_game() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = DbError::corrupt_snapshot("g7", parse);
        assert_eq!(err.kind, DbErrorKind::Snapshot);
        let text = err.to_string();
        assert!(text.starts_with("Game store snapshot error: snapshot of game g7 is unreadable"));
    }

    #[test]
    fn test_query_failures_are_classified() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.kind, DbErrorKind::Query);
        assert!(err.to_string().starts_with("Game store query error: "));
    }
}
