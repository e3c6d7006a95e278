//! Record stores
//!
//! A collection is persisted as one JSON array per schema id, never one
//! entry per record. Writes are read-modify-write with no locking, so
//! concurrent writers may lose updates.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::errors::StoreError;

/// Storage for whole record collections keyed by schema id
pub trait RecordStore {
    /// Returns the collection, or an empty one if none was saved.
    fn load(&self, schema_id: &str) -> Result<Vec<Value>, StoreError>;

    /// Replaces the stored collection.
    fn save(&mut self, schema_id: &str, records: &[Value]) -> Result<(), StoreError>;

    /// Drops the collection. Removing a missing collection is not an error.
    fn remove(&mut self, schema_id: &str) -> Result<(), StoreError>;
}

/// In-process store, mostly for tests and one-shot commands
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, schema_id: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.collections.get(schema_id).cloned().unwrap_or_default())
    }

    fn save(&mut self, schema_id: &str, records: &[Value]) -> Result<(), StoreError> {
        self.collections
            .insert(schema_id.to_string(), records.to_vec());
        Ok(())
    }

    fn remove(&mut self, schema_id: &str) -> Result<(), StoreError> {
        self.collections.remove(schema_id);
        Ok(())
    }
}

/// Store writing `<data_dir>/collections/collection_<id>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    collection_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            collection_dir: data_dir.join("collections"),
        }
    }

    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    /// Path of the file backing a collection.
    ///
    /// Ids are limited to ASCII letters, digits, `-` and `_`.
    pub fn path_for(&self, schema_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !schema_id.is_empty()
            && schema_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(schema_id.to_string()));
        }
        Ok(self
            .collection_dir
            .join(format!("collection_{}.json", schema_id)))
    }
}

impl RecordStore for FileStore {
    fn load(&self, schema_id: &str) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(schema_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let parsed: Value = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            reason: format!("Invalid JSON: {}", e),
        })?;

        match parsed {
            Value::Array(records) => Ok(records),
            _ => Err(StoreError::Corrupt {
                path: path.display().to_string(),
                reason: "expected a JSON array of records".to_string(),
            }),
        }
    }

    fn save(&mut self, schema_id: &str, records: &[Value]) -> Result<(), StoreError> {
        let path = self.path_for(schema_id)?;
        fs::create_dir_all(&self.collection_dir)
            .map_err(|e| io_error(&self.collection_dir, e))?;

        let json = serde_json::to_string_pretty(records).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut file = File::create(&path).map_err(|e| io_error(&path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| io_error(&path, e))?;
        file.sync_all().map_err(|e| io_error(&path, e))?;

        Ok(())
    }

    fn remove(&mut self, schema_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(schema_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load("users").unwrap().is_empty());

        store.save("users", &[json!({"id": 1})]).unwrap();
        assert_eq!(store.load("users").unwrap(), vec![json!({"id": 1})]);

        store.remove("users").unwrap();
        assert!(store.load("users").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_layout() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());

        store.save("users", &[json!({"id": 1})]).unwrap();
        assert!(dir
            .path()
            .join("collections")
            .join("collection_users.json")
            .exists());
        assert_eq!(store.load("users").unwrap(), vec![json!({"id": 1})]);

        store.remove("users").unwrap();
        store.remove("users").unwrap();
        assert!(store.load("users").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_rejects_path_ids() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.load("../etc"),
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(store.load(""), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        fs::create_dir_all(store.collection_dir()).unwrap();
        fs::write(store.path_for("users").unwrap(), "{\"id\": 1}").unwrap();

        assert!(matches!(
            store.load("users"),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
