use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

/// Storage keys for the persisted flag sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistKey {
    FavoriteEmails,
    ReadEmails,
}

impl PersistKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PersistKey::FavoriteEmails => "favoriteEmails",
            PersistKey::ReadEmails => "readEmails",
        }
    }
}

/// Durable small string storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Read an id list stored as a JSON array. Missing or malformed values read as empty.
pub fn load_ids(kv: &dyn KeyValueStore, key: PersistKey) -> Vec<String> {
    let raw = match kv.get(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Could not read {}: {e}", key.as_str());
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Ignoring malformed {} value: {e}", key.as_str());
            Vec::new()
        }
    }
}

pub fn save_ids(kv: &dyn KeyValueStore, key: PersistKey, ids: &[String]) -> Result<()> {
    let raw = serde_json::to_string(ids)?;
    kv.set(key.as_str(), &raw)
}

/// In-process store, lost on exit.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory kv poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory kv poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
