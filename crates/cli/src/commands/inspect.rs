use super::Session;
use crate::display;
use crate::probe::FileNameExtractor;
use anyhow::Result;
use hostfit_core::engine::AlternativeAction;
use hostfit_core::host::MetadataExtractor;
use hostfit_core::program::ProgramCandidate;
use std::path::Path;
use std::process::ExitCode;

/// Run the pre-launch decisions for an executable
pub async fn inspect_command(session: &Session, exe: &Path) -> Result<ExitCode> {
    let engine = &session.engine;
    let file_name = exe
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some((key, program)) = engine.catalog().program_for_executable(&file_name) else {
        let candidate = ProgramCandidate::new(exe, FileNameExtractor.extract(exe));
        let outcome = engine.classify_unknown(&candidate).await;
        println!("{}", display::describe_classification(&outcome));
        if !outcome.should_proceed() {
            return Ok(ExitCode::FAILURE);
        }
        println!("🚀 Ready to launch {}", candidate.detected_name());
        return Ok(ExitCode::SUCCESS);
    };

    println!("🔍 Recognised {}", program.name);

    if let Some(offer) = engine.catalog().alternative_offer(key) {
        let outcome = engine.suggest_alternative(&offer, &session.managers).await?;
        println!("{}", display::describe_alternative(&outcome));
        if !outcome.should_proceed() {
            return Ok(ExitCode::FAILURE);
        }
        if let Some(AlternativeAction::Installed { .. }) = outcome.payload() {
            println!("✨ {} is installed; use it instead", offer.recommended_name);
            return Ok(ExitCode::SUCCESS);
        }
    }

    for kind in &program.warnings {
        let Some(context) = engine.catalog().warning_context(kind, &program.name) else {
            continue;
        };
        let verdict = engine.gate_warning(&context).await;
        println!("{}", display::describe_warning(kind, &verdict));
        if !verdict.proceed {
            println!("⏹  Launch cancelled");
            return Ok(ExitCode::FAILURE);
        }
    }

    println!("🚀 Ready to launch {}", program.name);
    Ok(ExitCode::SUCCESS)
}
