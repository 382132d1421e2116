//! Attempt database errors.

use derive_more::{Display, Error};
use tracing::instrument;
use wordhunt_engine::StoreError;

/// Attempt database failure, tagged with where it was raised.
#[derive(Debug, Clone, Display, Error)]
#[display("Attempt database error: {} at {}:{}", message, file, line)]
pub struct DbError {
    /// What went wrong.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// A stored column that does not fit the record type.
    #[track_caller]
    pub fn bad_column(column: &str, value: impl std::fmt::Display) -> Self {
        Self::new(format!("Column '{}' holds unusable value '{}'", column, value))
    }

    /// Pending migrations could not be applied.
    #[track_caller]
    pub fn migration(err: impl std::fmt::Display) -> Self {
        Self::new(format!("Migration failed: {}", err))
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("Query failed: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection failed: {}", err))
    }
}

// Engine callers see only StoreError; the location travels in the text.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Backend(err.to_string())
    }
}
