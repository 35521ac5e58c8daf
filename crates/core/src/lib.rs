//! hostfit - decides what a Windows-compatibility launcher should do before starting a program
//!
//! This crate provides functionality to:
//! - Describe installable dependencies, known programs and warnings in a policy catalog
//! - Decide when to prompt about missing dependencies, native alternatives and warnings
//! - Remember which classes of prompts the user opted out of
//! - Run allow-listed install commands in the background, one at a time
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod host;
pub mod preferences;
pub mod program;
pub mod safety;
pub mod surface;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use catalog::{AlternativeOffer, DependencySpec, PolicyCatalog, WarningContext};
pub use config::Settings;
pub use engine::{
    AlternativeAction, DecisionEngine, DecisionOutcome, DependencyReport, WarningVerdict,
};
pub use executor::{InstallEvent, InstallExecutor, InstallFailure, InstallOutcome};
pub use preferences::{PreferenceKey, PreferenceStore};
pub use program::{ProgramCandidate, ProgramClassification, ProgramKind, ProgramMetadata};
pub use safety::SafetyGate;
pub use surface::InteractionSurface;
