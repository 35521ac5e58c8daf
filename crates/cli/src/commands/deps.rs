use super::Session;
use crate::display;
use anyhow::{Result, bail};
use std::process::ExitCode;

/// Treat the named catalog dependencies as missing and evaluate them
pub async fn deps_command(session: &Session, names: &[String], required: bool) -> Result<ExitCode> {
    let catalog = session.engine.catalog();
    let mut missing = Vec::with_capacity(names.len());
    for name in names {
        let Some(dep) = catalog.dependency(name) else {
            bail!("Unknown dependency '{}'", name);
        };
        missing.push(dep.clone());
    }

    let outcome = session
        .engine
        .evaluate_dependencies(&missing, &session.platform, required)
        .await?;
    print!("{}", display::describe_dependencies(&outcome));

    Ok(if outcome.is_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
