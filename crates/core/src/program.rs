//! Types describing an executable the user wants to run

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What kind of program an unrecognised executable is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    /// Routed to game installers; the common case for unknown executables
    #[default]
    Game,
    Application,
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramKind::Game => f.write_str("game"),
            ProgramKind::Application => f.write_str("application"),
        }
    }
}

/// Hints read from an executable by a metadata extractor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub product_name: Option<String>,
    pub company_name: Option<String>,
}

/// An executable awaiting classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCandidate {
    pub exe_path: PathBuf,
    pub metadata: ProgramMetadata,
}

impl ProgramCandidate {
    pub fn new(exe_path: impl Into<PathBuf>, metadata: ProgramMetadata) -> Self {
        Self {
            exe_path: exe_path.into(),
            metadata,
        }
    }

    /// Product name when known, else the executable's file stem
    pub fn detected_name(&self) -> String {
        self.metadata
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.exe_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Unknown program".to_string())
    }

    pub fn publisher(&self) -> Option<&str> {
        self.metadata
            .company_name
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramClassification {
    pub kind: ProgramKind,
    pub display_name: String,
    pub publisher: Option<String>,
}

impl ProgramClassification {
    pub fn for_candidate(candidate: &ProgramCandidate, kind: ProgramKind) -> Self {
        Self {
            kind,
            display_name: candidate.detected_name(),
            publisher: candidate.publisher().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_name_prefers_product_name() {
        let candidate = ProgramCandidate::new(
            "/games/setup.exe",
            ProgramMetadata {
                product_name: Some("Space Game".into()),
                company_name: Some("Stars Ltd".into()),
            },
        );
        assert_eq!(candidate.detected_name(), "Space Game");
        assert_eq!(candidate.publisher(), Some("Stars Ltd"));
    }

    #[test]
    fn test_detected_name_falls_back_to_stem() {
        let candidate = ProgramCandidate::new(
            "/games/Launcher64.exe",
            ProgramMetadata {
                product_name: Some("  ".into()),
                company_name: Some(String::new()),
            },
        );
        assert_eq!(candidate.detected_name(), "Launcher64");
        assert_eq!(candidate.publisher(), None);
    }

    #[test]
    fn test_default_kind_is_game() {
        assert_eq!(ProgramKind::default(), ProgramKind::Game);
    }
}
