//! Normalized puzzle words.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Accented letters accepted in addition to `A-Z`.
const ACCENTED: &[char] = &[
    'Á', 'É', 'Í', 'Ó', 'Ú', 'Â', 'Ê', 'Î', 'Ô', 'Û', 'Ã', 'Õ', 'Ç',
];

/// Shortest word a selection can find.
pub const MIN_WORD_LEN: usize = 2;

/// Returns true for characters that may appear on the board.
pub fn is_board_letter(c: char) -> bool {
    c.is_ascii_uppercase() || ACCENTED.contains(&c)
}

/// An uppercase word made only of board letters.
///
/// Length and indexing are by character, never by byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Word(String);

impl Word {
    /// Normalizes raw input: uppercases and drops every non-letter.
    #[instrument(skip(raw))]
    pub fn normalize(raw: &str) -> Self {
        Self(
            raw.chars()
                .flat_map(char::to_uppercase)
                .filter(|c| is_board_letter(*c))
                .collect(),
        )
    }

    /// Number of letters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns true for the empty word.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Letter at position `i`.
    pub fn letter(&self, i: usize) -> Option<char> {
        self.0.chars().nth(i)
    }

    /// Letters in order.
    pub fn letters(&self) -> Vec<char> {
        self.0.chars().collect()
    }

    /// The word spelled backwards.
    pub fn reversed(&self) -> Self {
        Self(self.0.chars().rev().collect())
    }

    /// Keeps at most `max` letters.
    pub fn truncated(&self, max: usize) -> Self {
        Self(self.0.chars().take(max).collect())
    }

    /// Borrowed string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Word {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<&str> for Word {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
