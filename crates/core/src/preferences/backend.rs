use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable key/boolean storage behind a [`PreferenceStore`](super::PreferenceStore)
pub trait PreferenceBackend: Send + Sync {
    fn load(&self) -> Result<BTreeMap<String, bool>>;

    /// Persist the complete record; must be durable when it returns `Ok`
    fn store(&self, values: &BTreeMap<String, bool>) -> Result<()>;
}

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    preferences: BTreeMap<String, bool>,
}

/// JSON file backend, replaced atomically on every write
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "preferences.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn load(&self) -> Result<BTreeMap<String, bool>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Persistence(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        let file: PreferenceFile = serde_json::from_str(&contents).map_err(|e| {
            Error::Persistence(format!("Failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(file.preferences)
    }

    fn store(&self, values: &BTreeMap<String, bool>) -> Result<()> {
        let file = PreferenceFile {
            version: FORMAT_VERSION,
            preferences: values.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let tmp = self.temp_path();
            let mut f = std::fs::File::create(&tmp)?;
            f.write_all(contents.as_bytes())?;
            f.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| {
            Error::Persistence(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

/// In-memory backend; clones share the same record, which survives a store "restart"
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<BTreeMap<String, bool>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let backend = Self::default();
        backend
            .values
            .lock()
            .extend(values.into_iter().map(|(k, v)| (k.to_string(), v)));
        backend
    }

    /// Make subsequent writes fail, to exercise soft-fail paths
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.values.lock().clone()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load(&self) -> Result<BTreeMap<String, bool>> {
        Ok(self.values.lock().clone())
    }

    fn store(&self, values: &BTreeMap<String, bool>) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(Error::Persistence("simulated write failure".to_string()));
        }
        *self.values.lock() = values.clone();
        Ok(())
    }
}
