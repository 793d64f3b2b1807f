//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::GenError;

use super::StorageBackend;

/// Process-local backend used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, GenError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), GenError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GenError> {
        self.lock().remove(key);
        Ok(())
    }
}

impl MemoryBackend {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Poisoning only matters if a writer panicked mid-insert; the map is
        // still consistent, so keep serving it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
