use super::Session;
use crate::display;
use anyhow::{Context, Result};
use std::process::ExitCode;

pub async fn warn_command(session: &Session, kind: &str, program: &str) -> Result<ExitCode> {
    let context = session
        .engine
        .catalog()
        .warning_context(kind, program)
        .with_context(|| format!("Unknown warning kind '{}'", kind))?;

    let verdict = session.engine.gate_warning(&context).await;
    println!("{}", display::describe_warning(kind, &verdict));

    Ok(if verdict.proceed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
