//! Locally persisted client state.
//!
//! DESIGN
//! ======
//! Mirrors the browser's two stores: a short-lived session store that dies
//! with the process ([`MemoryStore`]) and a long-lived store that survives
//! restarts ([`FileStore`]). Sign-out clears both wholesale; there is no
//! selective key removal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Key under which the CLI keeps the session cookie.
pub const SESSION_COOKIE_KEY: &str = "session_cookie";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value store.
pub trait LocalStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be cleared.
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().clear();
        Ok(())
    }
}

/// JSON object persisted at a fixed path. A missing file reads as empty.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The short- and long-lived stores, cleared together.
#[derive(Clone)]
pub struct LocalState {
    pub session: Arc<dyn LocalStore>,
    pub local: Arc<dyn LocalStore>,
}

impl LocalState {
    #[must_use]
    pub fn new(session: Arc<dyn LocalStore>, local: Arc<dyn LocalStore>) -> Self {
        Self { session, local }
    }

    /// Both stores in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()), Arc::new(MemoryStore::default()))
    }

    /// Session cookie for this run: a newly `given` one is saved to the
    /// long-lived store, otherwise the saved one (if any) is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the long-lived store cannot be read or written.
    pub fn session_cookie(&self, given: Option<String>) -> Result<Option<String>, StorageError> {
        match given {
            Some(cookie) => {
                self.local.set(SESSION_COOKIE_KEY, &cookie)?;
                Ok(Some(cookie))
            }
            None => self.local.get(SESSION_COOKIE_KEY),
        }
    }

    /// Clear both stores. A failure in one does not stop the other.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] encountered.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let session = self.session.clear();
        let local = self.local.clear();
        session.and(local)
    }
}

#[cfg(test)]
#[path = "local_state_test.rs"]
mod tests;
