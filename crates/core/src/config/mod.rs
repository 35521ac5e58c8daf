//! Settings for the engine's host-facing collaborators

mod settings;

pub use settings::{CONFIG_ENV, HEADLESS_ENV, PLATFORM_ENV, Settings};
