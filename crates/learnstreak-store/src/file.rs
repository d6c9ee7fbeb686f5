//! Single-file persistence adapter

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::{PersistenceAdapter, StoreResult};

/// Adapter storing the blob in one file.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so a crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    path: PathBuf,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;

            #[cfg(unix)]
            {
                let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
            }
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "learnstreak".to_string());
        self.path
            .with_file_name(format!(".{}.tmp.{}", name, std::process::id()))
    }
}

impl PersistenceAdapter for FileAdapter {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        self.ensure_parent_dir()?;
        let tmp_path = self.tmp_path();

        {
            let mut f = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;

            #[cfg(unix)]
            {
                let _ = f.set_permissions(fs::Permissions::from_mode(0o600));
            }

            f.write_all(bytes)?;
            f.sync_all()?;
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Blob saved");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(path = %self.path.display(), "Blob cleared");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("data.json"));
        assert!(adapter.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_dirs_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("nested").join("data.json"));

        adapter.save(b"one").unwrap();
        adapter.save(b"two").unwrap();

        assert_eq!(adapter.load().unwrap().unwrap(), b"two");

        // No temp files left behind
        let entries: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("data.json"));

        adapter.save(b"bytes").unwrap();
        adapter.clear().unwrap();
        assert!(adapter.load().unwrap().is_none());
        adapter.clear().unwrap();
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let adapter = FileAdapter::new(dir.path());
        assert!(adapter.load().is_err());
    }
}
