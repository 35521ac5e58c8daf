//! Interfaces to the host-facing collaborators the engine relies on
//!
//! Implementations that touch the real system live with the command-line front end.

use crate::catalog::{ManagerId, PlatformId};
use crate::program::ProgramMetadata;
use std::path::Path;

/// Supplies product/publisher hints for an executable
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, exe_path: &Path) -> ProgramMetadata;
}

/// Supplies the PlatformId used to pick install commands
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> PlatformId;
}

/// Supplies the package managers usable on this host
pub trait ManagerProbe: Send + Sync {
    fn available_managers(&self) -> Vec<ManagerId>;
}

/// A platform known ahead of time, e.g. from configuration
#[derive(Debug, Clone)]
pub struct FixedPlatform(pub PlatformId);

impl PlatformDetector for FixedPlatform {
    fn detect(&self) -> PlatformId {
        self.0.clone()
    }
}

/// A manager list known ahead of time, e.g. from configuration
#[derive(Debug, Clone, Default)]
pub struct FixedManagers(pub Vec<ManagerId>);

impl ManagerProbe for FixedManagers {
    fn available_managers(&self) -> Vec<ManagerId> {
        self.0.clone()
    }
}
