//! SQLite persistence for game snapshots.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::GameRecord;
pub use repository::GameRepository;
