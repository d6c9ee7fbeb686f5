//! Validated settings (converted from raw config)

use crate::schema::RawConfig;
use crate::validation::{parse_backend, BackendKind};
use learnstreak_util::{default_data_dir, DEFAULT_BLOB_KEY, DEFAULT_DATA_FILENAME, DEFAULT_DB_FILENAME};
use std::path::PathBuf;
use std::time::Duration;

/// Default delay before a pending snapshot is written
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where app data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file
    File { path: PathBuf },
    /// A row in a SQLite key/value table
    Sqlite { path: PathBuf, key: String },
    /// Process memory only; nothing survives a restart
    Memory,
}

/// Validated settings ready for use by the streak store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage: StorageBackend,
    pub debounce: Duration,
    pub log_level: String,
}

impl Settings {
    /// Convert from a raw config that already passed validation
    pub fn from_raw(raw: RawConfig) -> Self {
        let kind = raw
            .storage
            .backend
            .as_deref()
            .and_then(|b| parse_backend(b).ok())
            .unwrap_or(BackendKind::File);

        let storage = match kind {
            BackendKind::File => StorageBackend::File {
                path: raw
                    .storage
                    .path
                    .unwrap_or_else(|| default_data_dir().join(DEFAULT_DATA_FILENAME)),
            },
            BackendKind::Sqlite => StorageBackend::Sqlite {
                path: raw
                    .storage
                    .path
                    .unwrap_or_else(|| default_data_dir().join(DEFAULT_DB_FILENAME)),
                key: raw
                    .storage
                    .key
                    .unwrap_or_else(|| DEFAULT_BLOB_KEY.to_string()),
            },
            BackendKind::Memory => StorageBackend::Memory,
        };

        let debounce = raw
            .persistence
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE);

        let log_level = raw
            .logging
            .level
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            storage,
            debounce,
            log_level,
        }
    }

    /// In-memory settings with the given debounce, for tests and previews
    pub fn in_memory(debounce: Duration) -> Self {
        Self {
            storage: StorageBackend::Memory,
            debounce,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageBackend::File {
                path: default_data_dir().join(DEFAULT_DATA_FILENAME),
            },
            debounce: DEFAULT_DEBOUNCE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
