//! Persistence for the last accepted access code

use crate::error::{GateError, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key the premium pages use for the stored code
pub const TOKEN_STORAGE_KEY: &str = "wealthyai_vip_code";

/// Key/value storage for the raw access code. No expiry is kept here.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

/// JSON object on disk, one entry per key; other keys are left untouched
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(GateError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, content).map_err(|e| {
            GateError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(TOKEN_STORAGE_KEY).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("WAI-GUEST-7721").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("WAI-GUEST-7721"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("storage.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("cs_test_123").unwrap();

        let reopened = FileTokenStore::new(dir.path().join("storage.json"));
        assert_eq!(reopened.load().unwrap().as_deref(), Some("cs_test_123"));

        reopened.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.save("WAI-GUEST-7721").unwrap();
        store.clear().unwrap();

        let content: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content.get("theme").and_then(Value::as_str), Some("dark"));
        assert!(!content.contains_key(TOKEN_STORAGE_KEY));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.load(), Err(GateError::Serialization(_))));
    }
}
