//! Persisted "don't ask again" decisions
//!
//! The record is loaded once, read before every prompt, and written through to the
//! backend on every opt-out. A failed write is reported but the in-memory value keeps
//! applying for the rest of the process.

mod backend;
mod key;

pub use backend::{JsonFileBackend, MemoryBackend, PreferenceBackend};
pub use key::PreferenceKey;

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, bool>,
    /// Set when the last write failed and the backend is behind memory
    unsynced: bool,
}

pub struct PreferenceStore {
    inner: Mutex<Inner>,
    backend: Box<dyn PreferenceBackend>,
}

impl PreferenceStore {
    /// Load the record from `backend`; an unreadable record starts empty
    pub fn load(backend: impl PreferenceBackend + 'static) -> Self {
        let values = match backend.load() {
            Ok(values) => values,
            Err(e) => {
                warn!("Ignoring unreadable preferences: {}", e);
                BTreeMap::new()
            }
        };
        debug!("Loaded {} preference entries", values.len());
        Self {
            inner: Mutex::new(Inner {
                values,
                unsynced: false,
            }),
            backend: Box::new(backend),
        }
    }

    /// Store backed by a JSON file at `path`
    pub fn open(path: &Path) -> Self {
        Self::load(JsonFileBackend::new(path))
    }

    /// Store that forgets everything when the process exits
    pub fn in_memory() -> Self {
        Self::load(MemoryBackend::new())
    }

    /// Whether prompts of this class are suppressed; absent means "do ask"
    pub fn get(&self, key: &PreferenceKey) -> bool {
        self.inner
            .lock()
            .values
            .get(key.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Record an opt-out and persist it before returning.
    ///
    /// Idempotent. On a write failure the suppression still applies in memory and
    /// an [`Error::Persistence`] is returned for the caller to report.
    pub fn set_suppressed(&self, key: &PreferenceKey) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.values.get(key.as_str()) == Some(&true) && !inner.unsynced {
            return Ok(());
        }
        inner.values.insert(key.as_str().to_string(), true);

        match self.backend.store(&inner.values) {
            Ok(()) => {
                inner.unsynced = false;
                debug!("Suppressed future prompts for '{}'", key);
                Ok(())
            }
            Err(e) => {
                inner.unsynced = true;
                warn!("Suppression of '{}' kept in memory only: {}", key, e);
                Err(match e {
                    Error::Persistence(msg) => Error::Persistence(msg),
                    other => Error::Persistence(other.to_string()),
                })
            }
        }
    }

    /// Keys currently suppressed, in key order
    pub fn suppressed(&self) -> Vec<PreferenceKey> {
        self.inner
            .lock()
            .values
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| PreferenceKey::new(k.clone()))
            .collect()
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("values", &self.inner.lock().values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_key_means_ask() {
        let store = PreferenceStore::in_memory();
        assert!(!store.get(&PreferenceKey::alternative_suggestions()));
    }

    #[test]
    fn test_explicit_false_means_ask() {
        let backend = MemoryBackend::with_values([("alternative_suggestions", false)]);
        let store = PreferenceStore::load(backend);
        assert!(!store.get(&PreferenceKey::alternative_suggestions()));
        assert!(store.suppressed().is_empty());
    }

    #[test]
    fn test_round_trip_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let store = PreferenceStore::open(&path);
        store.set_suppressed(&PreferenceKey::warnings("drm")).unwrap();
        assert!(store.get(&PreferenceKey::warnings("drm")));
        drop(store);

        let reloaded = PreferenceStore::open(&path);
        assert!(reloaded.get(&PreferenceKey::warnings("drm")));
        assert!(!reloaded.get(&PreferenceKey::warnings("anticheat")));
        assert!(!path.with_file_name("preferences.json.tmp").exists());
    }

    #[test]
    fn test_set_suppressed_is_idempotent() {
        let backend = MemoryBackend::new();
        let store = PreferenceStore::load(backend.clone());
        let key = PreferenceKey::alternative_suggestions();
        store.set_suppressed(&key).unwrap();
        store.set_suppressed(&key).unwrap();
        assert_eq!(store.suppressed(), vec![key]);
        assert_eq!(backend.snapshot().len(), 1);
    }

    #[test]
    fn test_write_failure_is_soft() {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let store = PreferenceStore::load(backend.clone());
        let key = PreferenceKey::warnings("drm");

        let err = store.set_suppressed(&key).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(store.get(&key));
        assert!(backend.snapshot().is_empty());

        // The next opt-out retries the write once storage recovers
        backend.set_fail_writes(false);
        store.set_suppressed(&key).unwrap();
        assert_eq!(backend.snapshot().get("drm_warnings"), Some(&true));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = PreferenceStore::open(&path);
        assert!(store.suppressed().is_empty());

        store.set_suppressed(&PreferenceKey::enhancement_suggestions()).unwrap();
        assert!(PreferenceStore::open(&path).get(&PreferenceKey::enhancement_suggestions()));
    }
}
