use crate::catalog::{AlternativeOffer, CommandSource, ManagerId, PackageId};
use crate::program::ProgramKind;
use serde::Serialize;
use std::path::PathBuf;

/// Number of benefits / install options shown per item
pub const MAX_LISTED: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ItemStatus {
    Missing,
    Installed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyItem {
    pub name: String,
    pub description: String,
    pub command: String,
    pub command_source: CommandSource,
    /// Whether a one-click install is offered for this item
    pub auto_installable: bool,
    pub benefits: Vec<String>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyPrompt {
    pub required: bool,
    pub platform: String,
    pub items: Vec<DependencyItem>,
    /// Step-by-step guide for installing everything from a terminal
    pub terminal_instructions: Vec<String>,
}

impl DependencyPrompt {
    pub fn item(&self, name: &str) -> Option<&DependencyItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn all_installed(&self) -> bool {
        self.items.iter().all(|i| i.status == ItemStatus::Installed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationPrompt {
    pub exe_path: PathBuf,
    pub detected_name: String,
    pub publisher: Option<String>,
    pub default: ProgramKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOption {
    pub manager: ManagerId,
    pub package: PackageId,
    pub command: String,
    pub auto_installable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativePrompt {
    pub offer: AlternativeOffer,
    /// Options usable on this host, in the offer's order
    pub install_options: Vec<InstallOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningPrompt {
    pub warning_kind: String,
    pub program_name: String,
    pub message: String,
    pub instructions: Vec<String>,
    pub opt_out_label: String,
}

/// Answer to a dependency prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyResponse {
    /// Run the one-click installs for these items, in order, then ask again
    Install(Vec<String>),
    Continue { suppress_future: bool },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationResponse {
    Choose(ProgramKind),
    AcceptDefault,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeChoice {
    Install,
    Continue,
    MoreInfo,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlternativeResponse {
    pub choice: AlternativeChoice,
    pub suppress_future: bool,
}

impl AlternativeResponse {
    pub fn new(choice: AlternativeChoice) -> Self {
        Self {
            choice,
            suppress_future: false,
        }
    }

    pub fn suppressing(choice: AlternativeChoice) -> Self {
        Self {
            choice,
            suppress_future: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningResponse {
    pub proceed: bool,
    pub suppress_future: bool,
}
