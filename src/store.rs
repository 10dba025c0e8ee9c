//! Persisted key-value preference storage
//!
//! The wallet flow only needs `get`/`set` on string keys. Two backends are
//! provided: an in-memory map for tests and embedding, and a JSON file that
//! survives restarts.

use crate::error::WalletError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Minimal key-value store for user preferences
///
/// Reads never fail: an unreadable backend behaves like an empty one.
pub trait PreferenceStore: Send + Sync {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), WalletError>;
}

/// In-memory preference store
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a single entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| WalletError::Preference(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preference store backed by a JSON object on disk
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FilePreferenceStore {
    /// Uses `path`; the file is created on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, WalletError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| WalletError::Preference(format!("corrupt preference file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(WalletError::Preference(e.to_string())),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.read().ok()?;
        match self.load() {
            Ok(values) => values.get(key).cloned(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read preferences, treating as empty"
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| WalletError::Preference(e.to_string()))?;

        // corrupt contents are overwritten
        let mut values = self.load().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());

        let contents = serde_json::to_string_pretty(&values)
            .map_err(|e| WalletError::Preference(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| WalletError::Preference(e.to_string()))?;
            }
        }
        std::fs::write(&self.path, contents).map_err(|e| WalletError::Preference(e.to_string()))?;

        tracing::debug!(key, value, "Stored preference");
        Ok(())
    }
}
