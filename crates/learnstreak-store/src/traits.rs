//! Persistence adapter contract

use crate::StoreResult;

/// Key-value byte store holding the single persisted app data blob.
///
/// The streak store is the only writer. Adapters make no assumption about
/// the content of the bytes.
pub trait PersistenceAdapter: Send + Sync {
    /// Read the stored bytes, `None` if nothing was ever saved (or it was cleared)
    fn load(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the stored bytes
    fn save(&self, bytes: &[u8]) -> StoreResult<()>;

    /// Remove the stored bytes
    fn clear(&self) -> StoreResult<()>;

    /// Short name for logs
    fn describe(&self) -> String;
}
