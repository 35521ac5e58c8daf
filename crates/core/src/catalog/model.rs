use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::preferences::PreferenceKey;

/// Identifier of a host distribution, e.g. `ubuntu`
pub type PlatformId = String;

/// Identifier of a package manager, e.g. `apt` or `flatpak`
pub type ManagerId = String;

/// Package name as understood by one package manager
pub type PackageId = String;

/// Command table key used when the host platform has no dedicated entry
pub const FALLBACK_PLATFORM: &str = "unknown";

/// Placeholder substituted with the program name in warning templates
pub const PROGRAM_PLACEHOLDER: &str = "{game_name}";

/// Placeholder substituted with the package name in package-manager templates
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

/// An installable requirement and how to install it on each platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Filled from the catalog key when omitted in the document
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub commands: IndexMap<PlatformId, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// Executable probed on PATH to decide whether the dependency is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            commands: IndexMap::new(),
            benefits: Vec::new(),
            required: false,
            binary: None,
        }
    }

    pub fn with_command(mut self, platform: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.insert(platform.into(), command.into());
        self
    }

    pub fn with_benefit(mut self, benefit: impl Into<String>) -> Self {
        self.benefits.push(benefit.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Executable name looked up on PATH
    pub fn binary_name(&self) -> &str {
        self.binary.as_deref().unwrap_or(&self.name)
    }

    /// Resolve the install command for `platform`.
    ///
    /// Falls back to the `unknown` entry, then to a manual-install placeholder.
    /// The returned text is never empty.
    pub fn resolve_command(&self, platform: &str) -> ResolvedCommand {
        let usable = |cmd: &&String| !cmd.trim().is_empty();

        if let Some(cmd) = self.commands.get(platform).filter(usable) {
            return ResolvedCommand {
                text: cmd.clone(),
                source: CommandSource::Platform,
            };
        }
        if let Some(cmd) = self.commands.get(FALLBACK_PLATFORM).filter(usable) {
            return ResolvedCommand {
                text: cmd.clone(),
                source: CommandSource::Fallback,
            };
        }
        ResolvedCommand {
            text: format!("# Please install {}", self.name),
            source: CommandSource::Manual,
        }
    }
}

/// Where a resolved install command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSource {
    Platform,
    Fallback,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCommand {
    pub text: String,
    pub source: CommandSource,
}

/// A Windows program the catalog knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub name: String,
    /// Executable file names (matched case-insensitively)
    #[serde(default)]
    pub executables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Alternatives>,
    /// Warning kinds that apply when launching this program
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Alternatives {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<RecommendedAlternative>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAlternative {
    pub name: String,
    #[serde(default)]
    pub packages: IndexMap<ManagerId, PackageId>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
}

/// Warning text shown before launching a program of a given kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningMessage {
    pub message: String,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// A native program suggested in place of a Windows one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeOffer {
    pub source_program_name: String,
    pub recommended_name: String,
    pub packages_by_manager: IndexMap<ManagerId, PackageId>,
    pub summary: String,
    pub critical_caveat: Option<String>,
    pub info_url: Option<String>,
}

/// Everything needed to render one warning prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningContext {
    pub warning_kind: String,
    pub program_name: String,
    pub message_template: String,
    pub instructions: Vec<String>,
}

impl WarningContext {
    pub fn new(
        warning_kind: impl Into<String>,
        program_name: impl Into<String>,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            warning_kind: warning_kind.into(),
            program_name: program_name.into(),
            message_template: message_template.into(),
            instructions: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Message with the program name substituted
    pub fn render_message(&self) -> String {
        self.message_template
            .replace(PROGRAM_PLACEHOLDER, &self.program_name)
    }

    pub fn preference_key(&self) -> PreferenceKey {
        PreferenceKey::warnings(&self.warning_kind)
    }

    /// Label of the "don't show again" option
    pub fn opt_out_label(&self) -> String {
        format!(
            "Don't show {} warnings again",
            self.warning_kind.replace('_', " ")
        )
    }
}
