//! SQLite persistence for attempt records.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{AttemptRow, NewAttemptRow};
pub use repository::{AttemptRepository, MIGRATIONS};
