use crate::{
    catalog::{ManagerId, PlatformId, PolicyCatalog},
    error::{Error, Result},
    preferences::PreferenceStore,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "HOSTFIT_CONFIG";
pub const PLATFORM_ENV: &str = "HOSTFIT_PLATFORM";
pub const HEADLESS_ENV: &str = "HOSTFIT_HEADLESS";

const APP_DIR: &str = "hostfit";
const SETTINGS_FILE: &str = "settings.json";
const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Settings {
    /// Catalog file to use instead of the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences_file: Option<PathBuf>,
    /// Skips platform detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformId>,
    /// Skips package manager probing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_managers: Option<Vec<ManagerId>>,
    pub headless: bool,
}

impl Settings {
    /// Load settings from `explicit`, `$HOSTFIT_CONFIG` or the user config dir, then
    /// apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut settings = match Self::locate(explicit, from_env) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// First candidate settings path, in lookup order
    pub fn locate(explicit: Option<&Path>, from_env: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE)))
    }

    /// Read a settings file; a missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse settings {}: {e}", path.display()))
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `HOSTFIT_PLATFORM` and `HOSTFIT_HEADLESS` through `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(platform) = lookup(PLATFORM_ENV).filter(|p| !p.trim().is_empty()) {
            self.platform = Some(platform.trim().to_lowercase());
        }
        if let Some(value) = lookup(HEADLESS_ENV) {
            match parse_flag(&value) {
                Some(flag) => self.headless = flag,
                None => warn!("Ignoring {}={:?}: expected true or false", HEADLESS_ENV, value),
            }
        }
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join(PREFERENCES_FILE)
        })
    }

    /// The configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<PolicyCatalog> {
        match &self.catalog {
            Some(path) => PolicyCatalog::load_from_file(path),
            None => PolicyCatalog::builtin(),
        }
    }

    pub fn open_preferences(&self) -> PreferenceStore {
        PreferenceStore::open(&self.preferences_path())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
