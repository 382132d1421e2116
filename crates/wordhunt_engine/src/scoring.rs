//! Score formula and elapsed-time helpers.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Points awarded per word plus a bonus for finishing fast.
///
/// `score = words * points_per_word
///        + max(0, time_bonus_seconds - elapsed) * time_bonus_multiplier`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
#[serde(default)]
pub struct ScoreRules {
    /// Points for each word found.
    points_per_word: u32,
    /// Seconds after which the time bonus is gone.
    time_bonus_seconds: u32,
    /// Points per second left on the bonus clock.
    time_bonus_multiplier: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            points_per_word: 100,
            time_bonus_seconds: 300,
            time_bonus_multiplier: 2,
        }
    }
}

impl ScoreRules {
    /// Score for `words_found` words after `elapsed_seconds`.
    #[instrument]
    pub fn score(&self, words_found: usize, elapsed_seconds: u64) -> u32 {
        let words = u32::try_from(words_found).unwrap_or(u32::MAX);
        let remaining = u64::from(self.time_bonus_seconds).saturating_sub(elapsed_seconds);
        let bonus = (remaining as u32).saturating_mul(self.time_bonus_multiplier);
        words.saturating_mul(self.points_per_word).saturating_add(bonus)
    }
}

/// Whole seconds from `started_at` to `now`, floored and never negative.
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - started_at).num_seconds()).unwrap_or(0)
}

/// Renders seconds as `mm:ss`; minutes keep growing past an hour.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
