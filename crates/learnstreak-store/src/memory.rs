//! In-memory persistence adapter for testing

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{PersistenceAdapter, StoreError, StoreResult};

/// In-memory adapter that records how often it was written
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    bytes: Mutex<Option<Vec<u8>>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
    fail_save: AtomicBool,
    fail_load: AtomicBool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter pre-seeded with stored bytes
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let adapter = Self::new();
        *adapter.slot() = Some(bytes.into());
        adapter
    }

    /// Bytes currently stored
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.slot().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of successful clears
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail
    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent loads fail
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    fn slot(&self) -> MutexGuard<'_, Option<Vec<u8>>> {
        self.bytes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock load failure".into()));
        }
        Ok(self.slot().clone())
    }

    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock save failure".into()));
        }
        *self.slot() = Some(bytes.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        *self.slot() = None;
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
