use hostfit_core::catalog::{CommandSource, PolicyCatalog};
use hostfit_core::engine::{AlternativeAction, DecisionOutcome, DependencyReport, WarningVerdict};
use hostfit_core::program::ProgramClassification;
use hostfit_core::surface::{
    AlternativePrompt, ClassificationPrompt, DependencyPrompt, ItemStatus, WarningPrompt,
};
use std::fmt::Write;

pub fn render_dependency_prompt(prompt: &DependencyPrompt) -> String {
    let mut out = String::new();
    if prompt.required {
        let _ = writeln!(out, "⚠️  Required dependencies are missing ({})", prompt.platform);
    } else {
        let _ = writeln!(out, "💡 Optional enhancements are available ({})", prompt.platform);
    }

    for item in &prompt.items {
        let marker = match &item.status {
            ItemStatus::Missing => "•".to_string(),
            ItemStatus::Installed => "✅".to_string(),
            ItemStatus::Failed(_) => "❌".to_string(),
        };
        let _ = writeln!(out, "\n  {} {} - {}", marker, item.name, item.description);
        for benefit in &item.benefits {
            let _ = writeln!(out, "      + {}", benefit);
        }
        let how = match (item.auto_installable, item.command_source) {
            (true, _) => "one-click",
            (false, CommandSource::Manual) => "manual",
            (false, _) => "terminal",
        };
        let _ = writeln!(out, "      $ {}  [{}]", item.command, how);
        if let ItemStatus::Failed(reason) = &item.status {
            let _ = writeln!(out, "      ! {}", reason);
        }
    }

    let _ = writeln!(out, "\n📋 Terminal installation:");
    for line in &prompt.terminal_instructions {
        let _ = writeln!(out, "   {}", line);
    }
    out
}

pub fn render_classification_prompt(prompt: &ClassificationPrompt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "❓ Unknown program: {}", prompt.detected_name);
    let _ = writeln!(out, "   Location: {}", prompt.exe_path.display());
    if let Some(publisher) = &prompt.publisher {
        let _ = writeln!(out, "   Publisher: {}", publisher);
    }
    let _ = writeln!(out, "   Default: {}", prompt.default);
    out
}

pub fn render_alternative_prompt(prompt: &AlternativePrompt) -> String {
    let offer = &prompt.offer;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🐧 {} has a native alternative: {}",
        offer.source_program_name, offer.recommended_name
    );
    if !offer.summary.is_empty() {
        let _ = writeln!(out, "   {}", offer.summary);
    }
    if let Some(caveat) = &offer.critical_caveat {
        let _ = writeln!(out, "   ⚠️  {}", caveat);
    }
    if prompt.install_options.is_empty() {
        let _ = writeln!(out, "   No supported package manager found on this system");
    }
    for option in &prompt.install_options {
        let how = if option.auto_installable {
            "one-click"
        } else {
            "terminal"
        };
        let _ = writeln!(out, "   {}: $ {}  [{}]", option.manager, option.command, how);
    }
    out
}

pub fn render_warning_prompt(prompt: &WarningPrompt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "⚠️  {}", prompt.message);
    for (i, instruction) in prompt.instructions.iter().enumerate() {
        let _ = writeln!(out, "   {}. {}", i + 1, instruction);
    }
    out
}

pub fn describe_dependencies(outcome: &DecisionOutcome<DependencyReport>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🔍 Dependencies: {}", outcome.name());
    if let Some(report) = outcome.payload() {
        let installed = report.installed();
        if !installed.is_empty() {
            let _ = writeln!(out, "   • Installed: {}", installed.join(", "));
        }
        for attempt in report.failed() {
            if let hostfit_core::InstallOutcome::Failed(reason) = &attempt.outcome {
                let _ = writeln!(out, "   • Failed: {} ({})", attempt.package, reason);
            }
        }
        if !report.remaining.is_empty() {
            let _ = writeln!(out, "   • Still missing: {}", report.remaining.join(", "));
        }
    }
    out
}

pub fn describe_alternative(outcome: &DecisionOutcome<AlternativeAction>) -> String {
    let detail = match outcome.payload() {
        None => "no decision".to_string(),
        Some(AlternativeAction::Installed { package, manager, .. }) => {
            format!("installed {} with {}", package, manager)
        }
        Some(AlternativeAction::InstallFailed { package, reason, .. }) => {
            format!("installing {} failed: {}", package, reason)
        }
        Some(AlternativeAction::ManualInstall { command: Some(command) }) => {
            format!("install manually with: {}", command)
        }
        Some(AlternativeAction::ManualInstall { command: None }) => {
            "no package available for this system".to_string()
        }
        Some(AlternativeAction::ContinueOriginal) => "continuing with the original".to_string(),
        Some(AlternativeAction::MoreInfo { url: Some(url) }) => format!("more info: {}", url),
        Some(AlternativeAction::MoreInfo { url: None }) => "no more information".to_string(),
        Some(AlternativeAction::Cancelled) => "cancelled".to_string(),
    };
    format!("🐧 Alternative: {} ({})", outcome.name(), detail)
}

pub fn describe_classification(outcome: &DecisionOutcome<ProgramClassification>) -> String {
    match outcome {
        DecisionOutcome::Decline { .. } => "❓ Classification cancelled".to_string(),
        other => match other.payload() {
            Some(c) => format!("🎮 {} classified as {}", c.display_name, c.kind),
            None => "❓ No classification".to_string(),
        },
    }
}

pub fn describe_warning(kind: &str, verdict: &WarningVerdict) -> String {
    format!(
        "⚠️  Warning '{}': proceed={}, suppress_future={}",
        kind, verdict.proceed, verdict.suppress_future
    )
}

pub fn render_catalog_summary(catalog: &PolicyCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📦 Catalog");
    let _ = writeln!(out, "   Platforms: {}", catalog.platforms().join(", "));
    let managers: Vec<&str> = catalog.package_managers().map(String::as_str).collect();
    let _ = writeln!(out, "   Package managers: {}", managers.join(", "));
    let _ = writeln!(out, "   Dependencies:");
    for dep in catalog.dependencies() {
        let kind = if dep.required { "required" } else { "enhancement" };
        let _ = writeln!(out, "     • {} ({}) - {}", dep.name, kind, dep.description);
    }
    let _ = writeln!(out, "   Programs:");
    for (key, program) in catalog.programs() {
        let alternative = catalog
            .alternative_offer(key)
            .map(|o| format!(" -> {}", o.recommended_name))
            .unwrap_or_default();
        let _ = writeln!(out, "     • {}{}", program.name, alternative);
    }
    let kinds: Vec<&str> = catalog.warning_kinds().map(String::as_str).collect();
    let _ = writeln!(out, "   Warning kinds: {}", kinds.join(", "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfit_core::catalog::DependencySpec;
    use hostfit_core::surface::DependencyItem;

    fn prompt(required: bool) -> DependencyPrompt {
        let dep = DependencySpec::new("wine", "Windows compatibility layer")
            .with_command("ubuntu", "sudo apt install wine");
        let resolved = dep.resolve_command("ubuntu");
        DependencyPrompt {
            required,
            platform: "ubuntu".to_string(),
            items: vec![DependencyItem {
                name: dep.name.clone(),
                description: dep.description.clone(),
                command: resolved.text,
                command_source: resolved.source,
                auto_installable: true,
                benefits: vec!["Runs Windows programs".to_string()],
                status: ItemStatus::Failed("cancelled".to_string()),
            }],
            terminal_instructions: vec!["   sudo apt install wine".to_string()],
        }
    }

    #[test]
    fn test_dependency_prompt_rendering() {
        let text = render_dependency_prompt(&prompt(true));
        assert!(text.starts_with("⚠️  Required dependencies are missing (ubuntu)"));
        assert!(text.contains("❌ wine - Windows compatibility layer"));
        assert!(text.contains("$ sudo apt install wine  [one-click]"));
        assert!(text.contains("! cancelled"));

        let optional = render_dependency_prompt(&prompt(false));
        assert!(optional.contains("Optional enhancements"));
        assert!(optional.contains("+ Runs Windows programs"));
    }

    #[test]
    fn test_describe_alternative() {
        let outcome = DecisionOutcome::Proceed(AlternativeAction::ManualInstall {
            command: Some("sudo dnf install gimp".to_string()),
        });
        assert_eq!(
            describe_alternative(&outcome),
            "🐧 Alternative: proceed (install manually with: sudo dnf install gimp)"
        );
        assert_eq!(
            describe_alternative(&DecisionOutcome::Deferred),
            "🐧 Alternative: deferred (no decision)"
        );
    }

    #[test]
    fn test_catalog_summary_lists_everything() {
        let catalog = PolicyCatalog::builtin().unwrap();
        let text = render_catalog_summary(&catalog);
        assert!(text.contains("wine (required)"));
        assert!(text.contains("Adobe Photoshop -> GIMP"));
        assert!(text.contains("drm"));
    }
}
