pub mod catalog;
pub mod check;
pub mod deps;
pub mod inspect;
pub mod prefs;
pub mod warn;

pub use catalog::catalog_command;
pub use check::check_command;
pub use deps::deps_command;
pub use inspect::inspect_command;
pub use prefs::prefs_command;
pub use warn::warn_command;

use crate::probe::{OsReleasePlatform, PathManagerProbe};
use crate::surface::TerminalSurface;
use anyhow::{Context, Result};
use hostfit_core::catalog::{ManagerId, PlatformId};
use hostfit_core::host::{FixedManagers, FixedPlatform, ManagerProbe, PlatformDetector};
use hostfit_core::{DecisionEngine, Settings};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Everything a subcommand needs: settings, the engine, and what was detected about the host
pub struct Session {
    pub settings: Settings,
    pub engine: DecisionEngine,
    pub platform: PlatformId,
    pub managers: Vec<ManagerId>,
}

impl Session {
    pub fn open(config: Option<&Path>, headless: bool) -> Result<Self> {
        let settings = Settings::load(config).context("Failed to load settings")?;
        let catalog = settings
            .load_catalog()
            .context("Failed to load policy catalog")?;

        let detector: Box<dyn PlatformDetector> = match &settings.platform {
            Some(platform) => Box::new(FixedPlatform(platform.clone())),
            None => Box::new(OsReleasePlatform::new(catalog.platforms().to_vec())),
        };
        let probe: Box<dyn ManagerProbe> = match &settings.package_managers {
            Some(managers) => Box::new(FixedManagers(managers.clone())),
            None => Box::new(PathManagerProbe::new(
                catalog.package_managers().cloned().collect(),
            )),
        };
        let platform = detector.detect();
        let managers = probe.available_managers();
        debug!("Platform {}, package managers {:?}", platform, managers);

        let preferences = settings.open_preferences();
        let mut engine = DecisionEngine::new(catalog, preferences);
        if !(headless || settings.headless) {
            engine = engine.with_surface(Arc::new(TerminalSurface::new()));
        }

        Ok(Self {
            settings,
            engine,
            platform,
            managers,
        })
    }
}
