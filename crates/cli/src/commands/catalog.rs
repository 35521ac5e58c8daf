use crate::display;
use anyhow::{Context, Result};
use hostfit_core::{PolicyCatalog, Settings};
use std::path::Path;

/// Load and validate a catalog, then summarise it
pub fn catalog_command(file: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let catalog = match file {
        Some(path) => PolicyCatalog::load_from_file(path)
            .with_context(|| format!("Invalid catalog {}", path.display()))?,
        None => Settings::load(config)
            .context("Failed to load settings")?
            .load_catalog()
            .context("Failed to load policy catalog")?,
    };
    print!("{}", display::render_catalog_summary(&catalog));
    Ok(())
}
