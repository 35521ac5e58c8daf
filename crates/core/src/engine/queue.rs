use super::outcome::InstallAttempt;
use crate::executor::{InstallEvent, InstallExecutor, InstallFailure, InstallOutcome};
use crate::surface::InteractionSurface;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub package: String,
    pub command: String,
}

/// Installs requested from one prompt, run strictly one after another in arrival order
#[derive(Debug, Default)]
pub struct InstallQueue {
    pending: VecDeque<InstallRequest>,
}

impl InstallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request; a package already queued is not queued twice
    pub fn push(&mut self, package: impl Into<String>, command: impl Into<String>) {
        let package = package.into();
        if self.pending.iter().any(|r| r.package == package) {
            return;
        }
        self.pending.push_back(InstallRequest {
            package,
            command: command.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub async fn run(
        mut self,
        executor: &InstallExecutor,
        surface: &dyn InteractionSurface,
    ) -> Vec<InstallAttempt> {
        let mut attempts = Vec::with_capacity(self.pending.len());
        while let Some(request) = self.pending.pop_front() {
            debug!(
                "Running queued install of {} ({} left)",
                request.package,
                self.pending.len()
            );
            let outcome = run_one(executor, surface, &request).await;
            attempts.push(InstallAttempt {
                package: request.package,
                command: request.command,
                outcome,
            });
        }
        attempts
    }
}

/// Run one install, relaying its events and honouring a cancel request from the surface
async fn run_one(
    executor: &InstallExecutor,
    surface: &dyn InteractionSurface,
    request: &InstallRequest,
) -> InstallOutcome {
    let mut handle = match executor.start(&request.command, &request.package) {
        Ok(handle) => handle,
        Err(e) => {
            let failure = InstallFailure::Rejected(e.to_string());
            surface
                .install_event(&request.package, &InstallEvent::Failed(failure.clone()))
                .await;
            return InstallOutcome::Failed(failure);
        }
    };

    // One cancel listener for the whole install, so a request between events is kept
    let cancel = surface.cancel_requested();
    tokio::pin!(cancel);
    let mut cancel_sent = false;
    loop {
        tokio::select! {
            biased;
            _ = &mut cancel, if !cancel_sent => {
                debug!("Cancel requested for install of {}", request.package);
                handle.cancel();
                cancel_sent = true;
            }
            event = handle.next_event() => {
                let Some(event) = event else {
                    return InstallOutcome::Failed(InstallFailure::Spawn(
                        "install finished without an outcome".to_string(),
                    ));
                };
                surface.install_event(&request.package, &event).await;
                match event {
                    InstallEvent::Progress(_) => {}
                    InstallEvent::Succeeded => return InstallOutcome::Succeeded,
                    InstallEvent::Failed(f) => return InstallOutcome::Failed(f),
                }
            }
        }
    }
}
