//! Streak store for learnstreak
//!
//! This crate is the heart of learnstreak, containing:
//! - The streak store (goal, daily log, freezes, completion)
//! - Precondition checks for logging, reported as `LogDecision`s
//! - The selection cursor used by calendar views
//! - Debounced persistence through a background flush worker
//! - Goal entry drafts for onboarding

mod engine;
mod flush;
mod onboarding;

pub use engine::*;
pub use onboarding::*;

use learnstreak_config::{load_config_or_default, Settings, StorageBackend};
use learnstreak_store::{FileAdapter, MemoryAdapter, PersistenceAdapter, SqliteAdapter};
use learnstreak_util::{default_config_path, Result, StreakError};
use std::sync::Arc;
use tracing::info;

/// Build the persistence adapter described by `settings`
pub fn open_adapter(settings: &Settings) -> Result<Arc<dyn PersistenceAdapter>> {
    let adapter: Arc<dyn PersistenceAdapter> = match &settings.storage {
        StorageBackend::File { path } => Arc::new(FileAdapter::new(path.clone())),
        StorageBackend::Sqlite { path, key } => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    StreakError::storage(format!("failed to create {}: {}", dir.display(), e))
                })?;
            }
            let adapter = SqliteAdapter::open(path, key.clone())
                .map_err(|e| StreakError::storage(e.to_string()))?;
            Arc::new(adapter)
        }
        StorageBackend::Memory => Arc::new(MemoryAdapter::new()),
    };

    info!(adapter = %adapter.describe(), "Storage opened");
    Ok(adapter)
}

/// Open a streak store as configured by `settings`
pub fn open_store(settings: &Settings) -> Result<StreakStore> {
    let adapter = open_adapter(settings)?;
    StreakStore::new(adapter, settings.debounce)
}

/// Open a streak store from the config file at the default location,
/// using default settings when no config file exists
pub fn open_default_store() -> Result<StreakStore> {
    let path = default_config_path();
    let settings =
        load_config_or_default(&path).map_err(|e| StreakError::config(e.to_string()))?;
    open_store(&settings)
}
