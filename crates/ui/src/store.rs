use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nox_core::session::{KeyValueStore, StoreError};

/// One file per key under a directory; the desktop stand-in for
/// `localStorage`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/nox`, falling back to the temp dir when the platform has
    /// no data dir.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("nox"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use nox_core::session::{SESSION_KEY, SessionManager};

    use super::*;

    fn scratch(name: &str) -> FileStore {
        let dir = std::env::temp_dir().join(format!("nox-store-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        FileStore::new(dir)
    }

    #[test]
    fn missing_key_is_none() {
        let store = scratch("missing");
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn session_survives_reopen() {
        let store = scratch("reopen");
        let dir = store.dir().to_path_buf();
        let mut manager = SessionManager::new(store);
        let session = manager.login("a@b.co", "secret", 42).unwrap();

        let reopened = SessionManager::new(FileStore::new(&dir));
        assert_eq!(reopened.current(), Some(session));

        let mut reopened = reopened;
        reopened.logout().unwrap();
        reopened.logout().unwrap();
        assert_eq!(reopened.current(), None);
        let _ = fs::remove_dir_all(dir);
    }
}
