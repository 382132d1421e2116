//! Match leaderboard.

use crate::attempt::{AttemptOutcome, AttemptRecord, PlayerId};
use crate::scoring::format_elapsed;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// One-based position.
    position: usize,
    /// Player.
    player_id: PlayerId,
    /// Final score.
    score: u32,
    /// Words found.
    words_found: u32,
    /// Seconds played.
    elapsed_seconds: u64,
    /// When the attempt ended.
    finished_at: DateTime<Utc>,
    /// Completed or abandoned.
    outcome: AttemptOutcome,
}

impl std::fmt::Display for RankingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>3}. {:<16} {:>6} pts  {:>2} words  {}",
            self.position,
            self.player_id,
            self.score,
            self.words_found,
            format_elapsed(self.elapsed_seconds)
        )
    }
}

/// Orders records by score, then shorter time, then earlier finish.
#[instrument(skip_all, fields(count = records.len()))]
pub fn rank(records: &[AttemptRecord]) -> Vec<RankingEntry> {
    let mut sorted: Vec<&AttemptRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.score()
            .cmp(a.score())
            .then_with(|| a.elapsed_seconds().cmp(&b.elapsed_seconds()))
            .then_with(|| a.finished_at().cmp(b.finished_at()))
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankingEntry {
            position: i + 1,
            player_id: record.player_id().clone(),
            score: *record.score(),
            words_found: *record.words_found(),
            elapsed_seconds: record.elapsed_seconds(),
            finished_at: *record.finished_at(),
            outcome: *record.outcome(),
        })
        .collect()
}
