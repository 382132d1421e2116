//! Attempt records and the store they are written to.
//!
//! A player gets exactly one attempt per match. The in-process engine checks
//! for a previous record before starting a session, but only the store can
//! make that check atomic, so [`AttemptStore::insert`] must refuse a second
//! record for the same pair.

use crate::scoring::{elapsed_seconds, format_elapsed};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Identifies a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display, derive_more::From)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies a match: one scheduled instance of a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display, derive_more::From)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Creates a match id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttemptOutcome {
    /// Every word was found.
    Completed,
    /// The player left early.
    Abandoned,
}

/// The permanent result of one player's one attempt at a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Who played.
    player_id: PlayerId,
    /// What was played.
    match_id: MatchId,
    /// Final score.
    score: u32,
    /// Number of words found.
    words_found: u32,
    /// When play started.
    started_at: DateTime<Utc>,
    /// When play ended.
    finished_at: DateTime<Utc>,
    /// Completed or abandoned.
    outcome: AttemptOutcome,
}

impl AttemptRecord {
    /// Whole seconds played.
    pub fn elapsed_seconds(&self) -> u64 {
        elapsed_seconds(self.started_at, self.finished_at)
    }

    /// Time played as `mm:ss`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }
}

/// What a player sees about an attempt once it is over.
///
/// Built only from the stored record, never from a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Final score.
    score: u32,
    /// Words found.
    words_found: u32,
    /// Seconds played.
    elapsed_seconds: u64,
    /// Completed or abandoned.
    outcome: AttemptOutcome,
}

impl From<&AttemptRecord> for SessionSummary {
    fn from(record: &AttemptRecord) -> Self {
        Self {
            score: record.score,
            words_found: record.words_found,
            elapsed_seconds: record.elapsed_seconds(),
            outcome: record.outcome,
        }
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Score: {} | Words: {} | Time: {} ({})",
            self.score,
            self.words_found,
            format_elapsed(self.elapsed_seconds),
            self.outcome
        )
    }
}

/// Failure reading or writing attempts.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StoreError {
    /// A record already exists for this player and match.
    #[display("Attempt already recorded for {} in {}", _0.player_id(), _0.match_id())]
    AlreadyRecorded(Box<AttemptRecord>),
    /// The backing store failed.
    #[display("Attempt store failure: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

/// Persistence boundary for attempt records.
pub trait AttemptStore {
    /// Looks up the record for a player and match.
    fn find(&self, player: &PlayerId, match_id: &MatchId) -> Result<Option<AttemptRecord>, StoreError>;

    /// Stores a record, refusing a second one for the same pair with
    /// [`StoreError::AlreadyRecorded`] carrying the stored record.
    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, StoreError>;

    /// All records of a match, in no particular order.
    fn list_for_match(&self, match_id: &MatchId) -> Result<Vec<AttemptRecord>, StoreError>;
}

/// Mutex-guarded store for tests and single-process use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttemptStore {
    records: Arc<Mutex<HashMap<(PlayerId, MatchId), AttemptRecord>>>,
}

impl InMemoryAttemptStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(PlayerId, MatchId), AttemptRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| StoreError::Backend(format!("Attempt store lock poisoned: {}", e)))
    }
}

impl AttemptStore for InMemoryAttemptStore {
    #[instrument(skip(self))]
    fn find(&self, player: &PlayerId, match_id: &MatchId) -> Result<Option<AttemptRecord>, StoreError> {
        let records = self.lock()?;
        Ok(records.get(&(player.clone(), match_id.clone())).cloned())
    }

    #[instrument(skip(self, record), fields(player = %record.player_id(), match_id = %record.match_id()))]
    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, StoreError> {
        let mut records = self.lock()?;
        let key = (record.player_id.clone(), record.match_id.clone());
        if let Some(existing) = records.get(&key) {
            warn!("Second attempt refused");
            return Err(StoreError::AlreadyRecorded(Box::new(existing.clone())));
        }
        records.insert(key, record.clone());
        info!(score = record.score, "Attempt recorded");
        Ok(record)
    }

    #[instrument(skip(self))]
    fn list_for_match(&self, match_id: &MatchId) -> Result<Vec<AttemptRecord>, StoreError> {
        let records = self.lock()?;
        let list: Vec<_> = records
            .values()
            .filter(|r| &r.match_id == match_id)
            .cloned()
            .collect();
        debug!(count = list.len(), "Attempts listed");
        Ok(list)
    }
}
