use super::Session;
use crate::display;
use crate::probe::find_on_path;
use anyhow::Result;
use hostfit_core::catalog::DependencySpec;
use std::process::ExitCode;
use tracing::debug;

pub async fn check_command(session: &Session, required_only: bool) -> Result<ExitCode> {
    let missing: Vec<DependencySpec> = session
        .engine
        .catalog()
        .dependencies()
        .filter(|dep| {
            let found = find_on_path(dep.binary_name());
            debug!("{}: {:?}", dep.binary_name(), found);
            found.is_none()
        })
        .cloned()
        .collect();

    let (required, enhancements): (Vec<_>, Vec<_>) =
        missing.into_iter().partition(|dep| dep.required);

    if required.is_empty() && (required_only || enhancements.is_empty()) {
        println!("✅ All dependencies are installed");
        return Ok(ExitCode::SUCCESS);
    }

    if !required.is_empty() {
        let outcome = session
            .engine
            .evaluate_dependencies(&required, &session.platform, true)
            .await?;
        print!("{}", display::describe_dependencies(&outcome));
        if outcome.is_fatal() {
            println!("⛔ Required dependencies are missing; cannot continue");
            return Ok(ExitCode::FAILURE);
        }
    }

    if !required_only && !enhancements.is_empty() {
        let outcome = session
            .engine
            .evaluate_dependencies(&enhancements, &session.platform, false)
            .await?;
        print!("{}", display::describe_dependencies(&outcome));
    }

    Ok(ExitCode::SUCCESS)
}
