//! JSON-file storage backend.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::GenError;

use super::StorageBackend;

/// Stores all entries as one pretty-printed JSON object in a single file.
///
/// Writes go through a temp file plus rename so a crash mid-write never
/// leaves a truncated store behind. Access from multiple processes is
/// last-write-wins.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, GenError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(GenError::StorageError(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            GenError::StorageError(format!("corrupt store file {}: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), GenError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                GenError::StorageError(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| GenError::StorageError(format!("failed to encode store: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| {
            GenError::StorageError(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            GenError::StorageError(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, GenError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), GenError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), GenError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = JsonFileBackend::new(&path);
        backend.save("a", "1").unwrap();
        backend.save("b", "2").unwrap();
        backend.remove("a").unwrap();

        let reopened = JsonFileBackend::new(&path);
        assert_eq!(reopened.load("a").unwrap(), None);
        assert_eq!(reopened.load("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nope.json"));
        assert_eq!(backend.load("x").unwrap(), None);
        // Removing from an empty store is a no-op, not an error.
        backend.remove("x").unwrap();
    }
}
