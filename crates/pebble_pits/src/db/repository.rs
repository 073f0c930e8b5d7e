//! Database repository for game snapshots.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameRecord, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for game snapshots.
///
/// Every call opens its own connection, so the repository is cheap to
/// clone and safe to move onto blocking worker threads. This also means an
/// in-memory path (`":memory:"`) does not persist between calls; use a file.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::empty_path());
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository and applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::migration(e))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::connect(&self.db_path, e))?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .execute(&mut conn)?;
        Ok(conn)
    }

    /// Inserts a new game row.
    ///
    /// Returns `false` without writing when a row with the same id exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record), fields(game_id = %record.id()))]
    pub fn insert_game(&self, record: &GameRecord) -> Result<bool, DbError> {
        let mut conn = self.connection()?;

        let inserted = diesel::insert_or_ignore_into(schema::games::table)
            .values(record)
            .execute(&mut conn)?;

        debug!(inserted, "Insert finished");
        Ok(inserted == 1)
    }

    /// Gets a game row by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_game(&self, game_id: &str) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;

        let record = schema::games::table
            .filter(schema::games::id.eq(game_id))
            .select(GameRecord::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = record.is_some(), "Game lookup finished");
        Ok(record)
    }

    /// Lists all game rows, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;

        let records = schema::games::table
            .order((schema::games::created_at.asc(), schema::games::id.asc()))
            .select(GameRecord::as_select())
            .load(&mut conn)?;

        info!(count = records.len(), "Games loaded");
        Ok(records)
    }

    /// Overwrites a game row only if its stored version equals `expected`.
    ///
    /// The check and the write are one `UPDATE` statement, so two writers
    /// holding the same version cannot both succeed. Returns `false` when no
    /// row matched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record), fields(game_id = %record.id(), next = record.version()))]
    pub fn update_game_if_version(&self, record: &GameRecord, expected: i64) -> Result<bool, DbError> {
        let mut conn = self.connection()?;

        let updated = diesel::update(
            schema::games::table
                .filter(schema::games::id.eq(record.id()))
                .filter(schema::games::version.eq(expected)),
        )
        .set((
            schema::games::version.eq(record.version()),
            schema::games::status.eq(record.status()),
            schema::games::snapshot.eq(record.snapshot()),
            schema::games::updated_at.eq(record.updated_at()),
        ))
        .execute(&mut conn)?;

        debug!(updated, "Conditional update finished");
        Ok(updated == 1)
    }
}
