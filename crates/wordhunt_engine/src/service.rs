//! Play service: wires access checks and attempt persistence around sessions.

use crate::attempt::{AttemptRecord, AttemptStore, MatchId, PlayerId, SessionSummary, StoreError};
use crate::puzzle::Puzzle;
use crate::scoring::ScoreRules;
use crate::session::{AccessError, FinishedSession, MatchContext, PlaySession, SessionSetup};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Failure opening or recording a session.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum PlayError {
    /// The session may not start.
    #[display("{}", _0)]
    Access(AccessError),
    /// The attempt store failed or refused the record.
    #[display("{}", _0)]
    Store(StoreError),
}

impl std::error::Error for PlayError {}

/// Opens sessions and records their results against an [`AttemptStore`].
#[derive(Debug, Clone)]
pub struct PlayService<S> {
    store: S,
    rules: ScoreRules,
}

impl<S: AttemptStore> PlayService<S> {
    /// Creates a service with the default score rules.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rules: ScoreRules::default(),
        }
    }

    /// Uses different score rules for new sessions.
    pub fn with_rules(mut self, rules: ScoreRules) -> Self {
        self.rules = rules;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up a previous attempt and starts a session if there is none.
    #[instrument(skip(self, puzzle), fields(player = %context.player_id(), match_id = %context.match_id()))]
    pub fn open(&self, context: MatchContext, puzzle: Arc<Puzzle>, now: DateTime<Utc>) -> Result<PlaySession, PlayError> {
        let previous = self.store.find(context.player_id(), context.match_id())?;
        let session = SessionSetup::new(context, puzzle)
            .with_rules(self.rules)
            .start(previous, now)?;
        Ok(session)
    }

    /// Persists the record of a finished session.
    ///
    /// The session is consumed, so its record can only be offered once. A
    /// concurrent session for the same pair that got there first surfaces as
    /// [`StoreError::AlreadyRecorded`].
    #[instrument(skip(self, finished), fields(outcome = %finished.outcome()))]
    pub fn record(&self, finished: FinishedSession) -> Result<AttemptRecord, PlayError> {
        let record = finished.into_record();
        match self.store.insert(record) {
            Ok(stored) => {
                info!(score = stored.score(), "Attempt persisted");
                Ok(stored)
            }
            Err(e) => {
                warn!(error = %e, "Attempt not persisted");
                Err(e.into())
            }
        }
    }

    /// The stored result for a player and match, if any.
    #[instrument(skip(self))]
    pub fn previous(&self, player: &PlayerId, match_id: &MatchId) -> Result<Option<SessionSummary>, PlayError> {
        let record = self.store.find(player, match_id)?;
        Ok(record.as_ref().map(SessionSummary::from))
    }
}
