//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Smallest accepted debounce delay in milliseconds
pub const MIN_DEBOUNCE_MS: u64 = 1;

/// Largest accepted debounce delay in milliseconds
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown storage backend '{0}' (expected file, sqlite or memory)")]
    UnknownBackend(String),

    #[error("Storage key cannot be empty")]
    EmptyKey,

    #[error("Storage key is only used by the sqlite backend, not '{0}'")]
    KeyWithoutSqlite(String),

    #[error("Storage path is not used by the memory backend")]
    PathWithMemory,

    #[error("debounce_ms {value} is outside {min}..={max}")]
    DebounceOutOfRange { value: u64, min: u64, max: u64 },

    #[error("Log level cannot be empty")]
    EmptyLogLevel,
}

/// Storage backend kinds accepted in `[storage] backend`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Sqlite,
    Memory,
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let backend = match config.storage.backend.as_deref() {
        None => Some(BackendKind::File),
        Some(name) => match parse_backend(name) {
            Ok(kind) => Some(kind),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    if let Some(key) = &config.storage.key {
        if key.trim().is_empty() {
            errors.push(ValidationError::EmptyKey);
        } else if let Some(kind) = backend
            && kind != BackendKind::Sqlite
        {
            errors.push(ValidationError::KeyWithoutSqlite(backend_name(kind).into()));
        }
    }

    if config.storage.path.is_some() && backend == Some(BackendKind::Memory) {
        errors.push(ValidationError::PathWithMemory);
    }

    if let Some(ms) = config.persistence.debounce_ms
        && !(MIN_DEBOUNCE_MS..=MAX_DEBOUNCE_MS).contains(&ms)
    {
        errors.push(ValidationError::DebounceOutOfRange {
            value: ms,
            min: MIN_DEBOUNCE_MS,
            max: MAX_DEBOUNCE_MS,
        });
    }

    if let Some(level) = &config.logging.level
        && level.trim().is_empty()
    {
        errors.push(ValidationError::EmptyLogLevel);
    }

    errors
}

/// Parse a backend name (case-insensitive)
pub fn parse_backend(name: &str) -> Result<BackendKind, ValidationError> {
    match name.trim().to_lowercase().as_str() {
        "file" | "json" => Ok(BackendKind::File),
        "sqlite" | "db" => Ok(BackendKind::Sqlite),
        "memory" | "mem" => Ok(BackendKind::Memory),
        _ => Err(ValidationError::UnknownBackend(name.to_string())),
    }
}

fn backend_name(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::File => "file",
        BackendKind::Sqlite => "sqlite",
        BackendKind::Memory => "memory",
    }
}
