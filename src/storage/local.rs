//! Local filesystem state store.
//!
//! State is a single JSON document. Writes go to a sibling `.tmp` file which
//! is synced and then renamed over the target, and the directory is synced
//! after the rename, so readers only ever see a complete document and the
//! rename itself survives a power loss.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::NotificationState;
use crate::storage::StateStore;

/// JSON file state store.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory holding the state file.
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Write bytes atomically (write to temp, sync, rename, sync directory).
    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        sync_dir(dir)
    }

    /// Read bytes, returning None if file doesn't exist.
    fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Flush the directory entry so a completed rename is durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files here; rename durability is left to
// the filesystem.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

impl StateStore for LocalStateStore {
    fn load(&self) -> Result<NotificationState> {
        match self.read_bytes()? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                log::info!(
                    "No state found at {}, starting fresh",
                    self.path.display()
                );
                Ok(NotificationState::default())
            }
        }
    }

    fn save(&self, state: &NotificationState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        self.write_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::storage::StateLedger;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_default() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path().join("state.json"));

        let state = store.load().unwrap();
        assert_eq!(state, NotificationState::default());
    }

    #[test]
    fn test_announcement_survives_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        let mut ledger = StateLedger::open(LocalStateStore::new(&path)).unwrap();
        ledger.mark_announced("Foo Party").unwrap();
        drop(ledger);

        let reloaded = StateLedger::open(LocalStateStore::new(&path)).unwrap();
        assert!(reloaded.is_announced("Foo Party"));
        assert!(!reloaded.is_announced("Bar Party"));
    }

    #[test]
    fn test_credential_survives_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/state.json");

        let mut ledger = StateLedger::open(LocalStateStore::new(&path)).unwrap();
        assert!(ledger.credential().is_none());
        ledger.set_credential(Credential::new("token-1")).unwrap();

        let reloaded = StateLedger::open(LocalStateStore::new(&path)).unwrap();
        assert_eq!(reloaded.credential(), Some(&Credential::new("token-1")));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let store = LocalStateStore::new(&path);

        store.save(&NotificationState::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_save_to_bare_file_name_uses_current_dir() {
        let store = LocalStateStore::new("state.json");
        assert_eq!(store.dir(), Path::new("."));

        let nested = LocalStateStore::new("a/b/state.json");
        assert_eq!(nested.dir(), Path::new("a/b"));
    }

    #[test]
    fn test_save_overwrites_and_syncs_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deep/state.json");
        let store = LocalStateStore::new(&path);

        let mut state = NotificationState::default();
        state.announced_names.insert("Foo".to_string());
        store.save(&state).unwrap();
        state.announced_names.insert("Bar".to_string());
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert!(sync_dir(path.parent().unwrap()).is_ok());
    }

    #[test]
    fn test_corrupt_state_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = LocalStateStore::new(&path);
        assert!(matches!(store.load(), Err(AppError::Json(_))));
    }
}
