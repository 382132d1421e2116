//! SQLite attempt repository.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};
use wordhunt_engine::{AttemptRecord, AttemptStore, MatchId, PlayerId, StoreError};

use crate::db::{AttemptRow, DbError, NewAttemptRow, schema};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Attempt records in a SQLite file.
///
/// A unique index on `(player_id, match_id)` makes the one-attempt rule hold
/// across processes: whoever inserts second gets [`StoreError::AlreadyRecorded`].
#[derive(Debug, Clone)]
pub struct AttemptRepository {
    db_path: String,
}

impl AttemptRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating AttemptRepository");
        Ok(Self { db_path })
    }

    /// Opens the database and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or a migration fails.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(DbError::migration)?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Gets the attempt of a player in a match. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_attempt(&self, player: &PlayerId, match_id: &MatchId) -> Result<Option<AttemptRecord>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::attempts::table
            .filter(schema::attempts::player_id.eq(player.as_str()))
            .filter(schema::attempts::match_id.eq(match_id.as_str()))
            .select(AttemptRow::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => {
                debug!(id = row.id(), "Attempt found");
                row.to_record().map(Some)
            }
            None => {
                debug!("No attempt yet");
                Ok(None)
            }
        }
    }

    /// Stores an attempt; `Ok(None)` means the pair already had one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record), fields(player = %record.player_id(), match_id = %record.match_id()))]
    pub fn insert_attempt(&self, record: &AttemptRecord) -> Result<Option<AttemptRecord>, DbError> {
        let new_row = NewAttemptRow::try_from(record)?;
        let mut conn = self.connection()?;

        let inserted = diesel::insert_into(schema::attempts::table)
            .values(&new_row)
            .returning(AttemptRow::as_returning())
            .get_result(&mut conn);

        match inserted {
            Ok(row) => {
                info!(id = row.id(), score = row.score(), "Attempt recorded");
                row.to_record().map(Some)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                warn!("Attempt already recorded for this pair");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every attempt of a match, oldest finish first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_attempts(&self, match_id: &MatchId) -> Result<Vec<AttemptRecord>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::attempts::table
            .filter(schema::attempts::match_id.eq(match_id.as_str()))
            .order(schema::attempts::finished_at.asc())
            .select(AttemptRow::as_select())
            .load(&mut conn)?;

        info!(count = rows.len(), "Attempts loaded");
        rows.iter().map(AttemptRow::to_record).collect()
    }
}

impl AttemptStore for AttemptRepository {
    fn find(&self, player: &PlayerId, match_id: &MatchId) -> Result<Option<AttemptRecord>, StoreError> {
        Ok(self.find_attempt(player, match_id)?)
    }

    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, StoreError> {
        if let Some(stored) = self.insert_attempt(&record)? {
            return Ok(stored);
        }
        match self.find_attempt(record.player_id(), record.match_id())? {
            Some(existing) => Err(StoreError::AlreadyRecorded(Box::new(existing))),
            None => Err(StoreError::Backend(
                "Unique violation reported but no stored attempt found".to_string(),
            )),
        }
    }

    fn list_for_match(&self, match_id: &MatchId) -> Result<Vec<AttemptRecord>, StoreError> {
        Ok(self.list_attempts(match_id)?)
    }
}
