//! Row types for the `attempts` table.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;
use wordhunt_engine::{AttemptOutcome, AttemptRecord, MatchId, PlayerId};

use crate::db::{DbError, schema};

/// A stored attempt.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::attempts)]
pub struct AttemptRow {
    id: i32,
    player_id: String,
    match_id: String,
    score: i32,
    words_found: i32,
    started_at: NaiveDateTime,
    finished_at: NaiveDateTime,
    outcome: String,
}

impl AttemptRow {
    /// Converts the row back into the engine's record; timestamps are UTC.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a column holds a value the record cannot carry.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn to_record(&self) -> Result<AttemptRecord, DbError> {
        let score = u32::try_from(self.score).map_err(|_| DbError::bad_column("score", self.score))?;
        let words_found =
            u32::try_from(self.words_found).map_err(|_| DbError::bad_column("words_found", self.words_found))?;
        let outcome = self
            .outcome
            .parse::<AttemptOutcome>()
            .map_err(|_| DbError::bad_column("outcome", &self.outcome))?;
        Ok(AttemptRecord::new(
            PlayerId::new(self.player_id.clone()),
            MatchId::new(self.match_id.clone()),
            score,
            words_found,
            self.started_at.and_utc(),
            self.finished_at.and_utc(),
            outcome,
        ))
    }
}

/// Insertable attempt.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::attempts)]
pub struct NewAttemptRow {
    player_id: String,
    match_id: String,
    score: i32,
    words_found: i32,
    started_at: NaiveDateTime,
    finished_at: NaiveDateTime,
    outcome: String,
}

impl TryFrom<&AttemptRecord> for NewAttemptRow {
    type Error = DbError;

    fn try_from(record: &AttemptRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            player_id: record.player_id().to_string(),
            match_id: record.match_id().to_string(),
            score: i32::try_from(*record.score()).map_err(|_| DbError::bad_column("score", record.score()))?,
            words_found: i32::try_from(*record.words_found())
                .map_err(|_| DbError::bad_column("words_found", record.words_found()))?,
            started_at: record.started_at().naive_utc(),
            finished_at: record.finished_at().naive_utc(),
            outcome: record.outcome().to_string(),
        })
    }
}
