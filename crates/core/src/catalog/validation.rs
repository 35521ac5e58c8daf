//! Whole-catalog validation run before a catalog is accepted

use super::PolicyCatalog;
use super::model::FALLBACK_PLATFORM;
use crate::error::{Error, Result};

/// Check every invariant of a freshly parsed catalog.
///
/// All problems are collected so a broken catalog file can be fixed in one pass.
pub fn validate(catalog: &PolicyCatalog) -> Result<()> {
    let mut problems = Vec::new();

    for (key, dep) in &catalog.dependencies {
        if dep.description.trim().is_empty() {
            problems.push(format!("dependency '{key}' has an empty description"));
        }
        if dep.commands.is_empty() {
            problems.push(format!("dependency '{key}' has no install commands"));
            continue;
        }
        for (platform, command) in &dep.commands {
            if command.trim().is_empty() {
                problems.push(format!(
                    "dependency '{key}' has a blank command for platform '{platform}'"
                ));
            }
        }
        if !dep.commands.contains_key(FALLBACK_PLATFORM) {
            let missing: Vec<&str> = catalog
                .platforms
                .iter()
                .filter(|p| !dep.commands.contains_key(p.as_str()))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() || catalog.platforms.is_empty() {
                problems.push(format!(
                    "dependency '{key}' has no '{FALLBACK_PLATFORM}' command and misses platforms [{}]",
                    missing.join(", ")
                ));
            }
        }
    }

    for (key, program) in &catalog.programs {
        if program.name.trim().is_empty() {
            problems.push(format!("program '{key}' has an empty name"));
        }
        for kind in &program.warnings {
            if !catalog.messages.contains_key(kind) {
                problems.push(format!(
                    "program '{key}' references unknown warning kind '{kind}'"
                ));
            }
        }
        if let Some(recommended) = program
            .alternatives
            .as_ref()
            .and_then(|a| a.recommended.as_ref())
        {
            if recommended.packages.is_empty() {
                problems.push(format!(
                    "alternative '{}' for program '{key}' lists no packages",
                    recommended.name
                ));
            }
        }
    }

    for (kind, message) in &catalog.messages {
        if message.message.trim().is_empty() {
            problems.push(format!("warning '{kind}' has an empty message"));
        }
    }

    for (manager, template) in &catalog.package_managers {
        if template.trim().is_empty() {
            problems.push(format!("package manager '{manager}' has an empty template"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "invalid catalog: {}",
            problems.join("; ")
        )))
    }
}
