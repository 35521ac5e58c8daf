//! The interaction surface: renders a prompt, returns one of its enumerated answers
//!
//! Surfaces hold no decision logic. The engine decides whether a prompt is needed,
//! and what an answer means.

mod prompt;
mod scripted;

pub use prompt::{
    AlternativeChoice, AlternativePrompt, AlternativeResponse, ClassificationPrompt,
    ClassificationResponse, DependencyItem, DependencyPrompt, DependencyResponse, InstallOption,
    ItemStatus, MAX_LISTED, WarningPrompt, WarningResponse,
};
pub use scripted::ScriptedSurface;

use crate::executor::InstallEvent;
use async_trait::async_trait;

#[async_trait]
pub trait InteractionSurface: Send + Sync {
    async fn resolve_dependencies(&self, prompt: &DependencyPrompt) -> DependencyResponse;

    async fn classify_program(&self, prompt: &ClassificationPrompt) -> ClassificationResponse;

    async fn choose_alternative(&self, prompt: &AlternativePrompt) -> AlternativeResponse;

    async fn confirm_warning(&self, prompt: &WarningPrompt) -> WarningResponse;

    /// Notification from the install running on the user's behalf
    async fn install_event(&self, _package: &str, _event: &InstallEvent) {}

    /// Resolves when the user asks to cancel the running install
    async fn cancel_requested(&self) {
        std::future::pending::<()>().await
    }
}
