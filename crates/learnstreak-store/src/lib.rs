//! Persistence adapters for learnstreak
//!
//! Provides:
//! - The `PersistenceAdapter` byte-store contract
//! - A single-file adapter with atomic replace
//! - A SQLite key/value adapter
//! - An in-memory adapter with failure injection for tests

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
