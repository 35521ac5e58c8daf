use super::prompt::*;
use super::InteractionSurface;
use crate::executor::InstallEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Script {
    dependency: VecDeque<DependencyResponse>,
    classification: VecDeque<ClassificationResponse>,
    alternative: VecDeque<AlternativeResponse>,
    warning: VecDeque<WarningResponse>,
}

#[derive(Debug, Default)]
struct Record {
    dependency: Vec<DependencyPrompt>,
    classification: Vec<ClassificationPrompt>,
    alternative: Vec<AlternativePrompt>,
    warning: Vec<WarningPrompt>,
    events: Vec<(String, InstallEvent)>,
}

/// Surface that replays queued answers and records every prompt it is shown.
///
/// With no answer queued it picks the prompt's default button: continue (or exit
/// for required dependencies), the default classification, continue with the
/// original program, and proceed past warnings.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    script: Mutex<Script>,
    record: Mutex<Record>,
    cancel_installs: bool,
    cancel: Notify,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation as soon as an install reports progress.
    ///
    /// Only a listener already waiting is woken; nothing carries over to the next install.
    pub fn cancelling_installs(mut self) -> Self {
        self.cancel_installs = true;
        self
    }

    pub fn answer_dependencies(self, response: DependencyResponse) -> Self {
        self.script.lock().dependency.push_back(response);
        self
    }

    pub fn answer_classification(self, response: ClassificationResponse) -> Self {
        self.script.lock().classification.push_back(response);
        self
    }

    pub fn answer_alternative(self, response: AlternativeResponse) -> Self {
        self.script.lock().alternative.push_back(response);
        self
    }

    pub fn answer_warning(self, proceed: bool, suppress_future: bool) -> Self {
        self.script.lock().warning.push_back(WarningResponse {
            proceed,
            suppress_future,
        });
        self
    }

    pub fn dependency_prompts(&self) -> Vec<DependencyPrompt> {
        self.record.lock().dependency.clone()
    }

    pub fn classification_prompts(&self) -> Vec<ClassificationPrompt> {
        self.record.lock().classification.clone()
    }

    pub fn alternative_prompts(&self) -> Vec<AlternativePrompt> {
        self.record.lock().alternative.clone()
    }

    pub fn warning_prompts(&self) -> Vec<WarningPrompt> {
        self.record.lock().warning.clone()
    }

    pub fn install_events(&self) -> Vec<(String, InstallEvent)> {
        self.record.lock().events.clone()
    }

    /// Total prompts shown so far, of any kind
    pub fn prompt_count(&self) -> usize {
        let record = self.record.lock();
        record.dependency.len()
            + record.classification.len()
            + record.alternative.len()
            + record.warning.len()
    }
}

#[async_trait]
impl InteractionSurface for ScriptedSurface {
    async fn resolve_dependencies(&self, prompt: &DependencyPrompt) -> DependencyResponse {
        self.record.lock().dependency.push(prompt.clone());
        let queued = self.script.lock().dependency.pop_front();
        queued.unwrap_or(if prompt.required {
            DependencyResponse::Exit
        } else {
            DependencyResponse::Continue {
                suppress_future: false,
            }
        })
    }

    async fn classify_program(&self, prompt: &ClassificationPrompt) -> ClassificationResponse {
        self.record.lock().classification.push(prompt.clone());
        let queued = self.script.lock().classification.pop_front();
        queued.unwrap_or(ClassificationResponse::AcceptDefault)
    }

    async fn choose_alternative(&self, prompt: &AlternativePrompt) -> AlternativeResponse {
        self.record.lock().alternative.push(prompt.clone());
        let queued = self.script.lock().alternative.pop_front();
        queued.unwrap_or(AlternativeResponse::new(AlternativeChoice::Continue))
    }

    async fn confirm_warning(&self, prompt: &WarningPrompt) -> WarningResponse {
        self.record.lock().warning.push(prompt.clone());
        let queued = self.script.lock().warning.pop_front();
        queued.unwrap_or(WarningResponse {
            proceed: true,
            suppress_future: false,
        })
    }

    async fn install_event(&self, package: &str, event: &InstallEvent) {
        self.record
            .lock()
            .events
            .push((package.to_string(), event.clone()));
        if self.cancel_installs && matches!(event, InstallEvent::Progress(_)) {
            self.cancel.notify_waiters();
        }
    }

    async fn cancel_requested(&self) {
        if self.cancel_installs {
            self.cancel.notified().await;
        } else {
            std::future::pending::<()>().await
        }
    }
}
