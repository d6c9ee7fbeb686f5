//! Default paths for learnstreak
//!
//! Paths are user-writable (no root required):
//! - Data: `$XDG_DATA_HOME/learnstreak` or `~/.local/share/learnstreak`
//! - Config: `$XDG_CONFIG_HOME/learnstreak/config.toml` or `~/.config/learnstreak/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const LEARNSTREAK_DATA_DIR_ENV: &str = "LEARNSTREAK_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "learnstreak";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Default filename of the JSON blob written by the file adapter
pub const DEFAULT_DATA_FILENAME: &str = "learnstreak.json";

/// Default filename of the SQLite database used by the sqlite adapter
pub const DEFAULT_DB_FILENAME: &str = "learnstreak.db";

/// Default key the app data blob is stored under in key/value stores
pub const DEFAULT_BLOB_KEY: &str = "learningAppV1Data";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$LEARNSTREAK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/learnstreak` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/learnstreak` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(LEARNSTREAK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking LEARNSTREAK_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/learnstreak/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/learnstreak/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}
