//! Declarative policy data: dependencies, programs, alternatives and warnings
//!
//! The catalog is loaded once at startup, either from a JSON document or from the
//! built-in defaults, and is never mutated afterwards. Loading validates the whole
//! document and rejects it as a unit.

mod defaults;
mod model;
mod validation;

pub use defaults::BUILTIN_CATALOG;
pub use model::{
    AlternativeOffer, Alternatives, CommandSource, DependencySpec, FALLBACK_PLATFORM, ManagerId,
    PACKAGE_PLACEHOLDER, PROGRAM_PLACEHOLDER, PackageId, PlatformId, ProgramEntry,
    RecommendedAlternative, ResolvedCommand, WarningContext, WarningMessage,
};

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyCatalog {
    /// Platforms every dependency must cover unless it has an `unknown` command
    #[serde(default)]
    platforms: Vec<PlatformId>,
    /// Install command templates keyed by package manager
    #[serde(default)]
    package_managers: IndexMap<ManagerId, String>,
    #[serde(default)]
    dependencies: IndexMap<String, DependencySpec>,
    #[serde(default)]
    programs: IndexMap<String, ProgramEntry>,
    #[serde(default)]
    messages: IndexMap<String, WarningMessage>,
}

impl PolicyCatalog {
    /// The catalog embedded in the library
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let mut catalog: PolicyCatalog = serde_json::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse catalog: {e}")))?;

        for (key, dep) in catalog.dependencies.iter_mut() {
            if dep.name.is_empty() {
                dep.name = key.clone();
            }
        }

        validation::validate(&catalog)?;
        tracing::debug!(
            "Loaded catalog with {} dependencies, {} programs, {} warning kinds",
            catalog.dependencies.len(),
            catalog.programs.len(),
            catalog.messages.len()
        );
        Ok(catalog)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    pub fn platforms(&self) -> &[PlatformId] {
        &self.platforms
    }

    pub fn dependency(&self, name: &str) -> Option<&DependencySpec> {
        self.dependencies.get(name)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies.values()
    }

    /// Dependencies that are hard requirements (`true`) or enhancements (`false`)
    pub fn dependencies_where(&self, required: bool) -> Vec<&DependencySpec> {
        self.dependencies
            .values()
            .filter(|d| d.required == required)
            .collect()
    }

    pub fn program(&self, key: &str) -> Option<&ProgramEntry> {
        self.programs.get(key)
    }

    pub fn programs(&self) -> impl Iterator<Item = (&String, &ProgramEntry)> {
        self.programs.iter()
    }

    /// Find the program whose executable list contains `file_name`
    pub fn program_for_executable(&self, file_name: &str) -> Option<(&str, &ProgramEntry)> {
        self.programs
            .iter()
            .find(|(_, p)| {
                p.executables
                    .iter()
                    .any(|exe| exe.eq_ignore_ascii_case(file_name))
            })
            .map(|(key, p)| (key.as_str(), p))
    }

    /// Build the alternative offer for a known program, if it has one
    pub fn alternative_offer(&self, program_key: &str) -> Option<AlternativeOffer> {
        let program = self.programs.get(program_key)?;
        let recommended = program.alternatives.as_ref()?.recommended.as_ref()?;
        Some(AlternativeOffer {
            source_program_name: program.name.clone(),
            recommended_name: recommended.name.clone(),
            packages_by_manager: recommended.packages.clone(),
            summary: recommended.summary.clone(),
            critical_caveat: recommended.caveat.clone(),
            info_url: recommended.info_url.clone(),
        })
    }

    pub fn warning_context(&self, kind: &str, program_name: &str) -> Option<WarningContext> {
        let message = self.messages.get(kind)?;
        Some(WarningContext {
            warning_kind: kind.to_string(),
            program_name: program_name.to_string(),
            message_template: message.message.clone(),
            instructions: message.instructions.clone(),
        })
    }

    pub fn warning_kinds(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }

    pub fn package_managers(&self) -> impl Iterator<Item = &ManagerId> {
        self.package_managers.keys()
    }

    /// Install command for `package` through `manager`, from the manager's template
    pub fn install_command(&self, manager: &str, package: &str) -> Option<String> {
        self.package_managers
            .get(manager)
            .map(|template| template.replace(PACKAGE_PLACEHOLDER, package))
    }
}
