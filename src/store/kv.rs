//! String key-value stores backing progress persistence

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::{CharmError, Result};

/// Minimal get/set-by-key storage
///
/// `set` and `remove` stage changes; `commit` makes them durable in one step.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Volatile store, used in tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// All keys in a single JSON object on disk
///
/// Commits write a sibling temp file and rename it over the original, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it is missing or unreadable as JSON
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read(path)?;
            match serde_json::from_slice(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring malformed store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn commit(&mut self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            CharmError::Storage(format!("replacing {}: {}", self.path.display(), e))
        })
    }
}
