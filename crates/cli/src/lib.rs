pub mod cli;
pub mod commands;
pub mod display;
pub mod probe;
pub mod surface;

// Re-export commonly used items
pub use cli::{Cli, Commands};
pub use surface::TerminalSurface;
