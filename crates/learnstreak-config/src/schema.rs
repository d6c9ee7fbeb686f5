//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Where app data is persisted
    #[serde(default)]
    pub storage: RawStorageConfig,

    /// Write coalescing
    #[serde(default)]
    pub persistence: RawPersistenceConfig,

    #[serde(default)]
    pub logging: RawLoggingConfig,
}

/// Storage backend selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// "file", "sqlite" or "memory" (default: file)
    pub backend: Option<String>,

    /// File or database path (default: under the data directory)
    pub path: Option<PathBuf>,

    /// Row key for the sqlite backend (default: learningAppV1Data)
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPersistenceConfig {
    /// Delay in milliseconds before a pending snapshot is written
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub level: Option<String>,
}
