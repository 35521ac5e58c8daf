use std::io;

/// Errors that can occur during hostfit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("An installation is already running ({package})")]
    JobAlreadyRunning { package: String },

    #[error("No missing dependencies were given")]
    EmptyDependencySet,

    #[error("Invalid interaction transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for hostfit operations
pub type Result<T> = std::result::Result<T, Error>;
