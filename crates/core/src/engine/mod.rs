//! The decision engine: decides whether a prompt is needed, drives it, and commits the outcome
//!
//! Every entry point follows the same cycle: consult the [`PreferenceStore`], ask the
//! interaction surface (unless headless), consult the [`SafetyGate`] before offering
//! one-click installs, and run accepted installs through the [`InstallExecutor`].

mod interaction;
mod outcome;
mod queue;

pub use interaction::{Interaction, InteractionState};
pub use outcome::{
    AlternativeAction, DecisionOutcome, DependencyReport, InstallAttempt, WarningVerdict,
};
pub use queue::{InstallQueue, InstallRequest};

use crate::catalog::{AlternativeOffer, DependencySpec, ManagerId, PolicyCatalog, WarningContext};
use crate::error::{Error, Result};
use crate::executor::{InstallExecutor, InstallOutcome};
use crate::preferences::{PreferenceKey, PreferenceStore};
use crate::program::{ProgramCandidate, ProgramClassification, ProgramKind};
use crate::safety::SafetyGate;
use crate::surface::{
    AlternativeChoice, AlternativePrompt, ClassificationPrompt, ClassificationResponse,
    DependencyItem, DependencyPrompt, DependencyResponse, InstallOption, InteractionSurface,
    ItemStatus, MAX_LISTED, WarningPrompt,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct DecisionEngine {
    catalog: PolicyCatalog,
    preferences: PreferenceStore,
    executor: InstallExecutor,
    /// `None` means headless: deterministic defaults, nothing is ever shown
    surface: Option<Arc<dyn InteractionSurface>>,
}

impl DecisionEngine {
    /// A headless engine; attach a surface with [`with_surface`](Self::with_surface)
    pub fn new(catalog: PolicyCatalog, preferences: PreferenceStore) -> Self {
        Self {
            catalog,
            preferences,
            executor: InstallExecutor::new(),
            surface: None,
        }
    }

    pub fn with_surface(mut self, surface: Arc<dyn InteractionSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_executor(mut self, executor: InstallExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn executor(&self) -> &InstallExecutor {
        &self.executor
    }

    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }

    /// Decide what to do about dependencies missing on `platform`.
    ///
    /// Required sets are always shown and can only resolve to `Proceed` once every
    /// item was installed during the prompt; otherwise the outcome is a fatal
    /// `Decline`. Enhancement sets honour the `enhancement_suggestions` opt-out.
    pub async fn evaluate_dependencies(
        &self,
        missing: &[DependencySpec],
        platform: &str,
        required: bool,
    ) -> Result<DecisionOutcome<DependencyReport>> {
        if missing.is_empty() {
            return Err(Error::EmptyDependencySet);
        }

        let mut interaction = Interaction::new("dependencies");
        let suppress_key = PreferenceKey::enhancement_suggestions();
        let mut prompt = build_dependency_prompt(missing, platform, required);
        let mut report = DependencyReport {
            platform: platform.to_string(),
            attempts: Vec::new(),
            remaining: missing.iter().map(|d| d.name.clone()).collect(),
        };

        if !required && self.preferences.get(&suppress_key) {
            debug!("Enhancement suggestions suppressed; skipping prompt");
            interaction.advance(InteractionState::Resolved)?;
            return Ok(DecisionOutcome::Proceed(report));
        }

        let Some(surface) = self.surface.as_deref() else {
            interaction.advance(InteractionState::Resolved)?;
            info!(
                "Declining missing dependencies in headless mode: {}",
                report.remaining.join(", ")
            );
            return Ok(DecisionOutcome::Decline {
                payload: report,
                fatal: required,
            });
        };

        interaction.advance(InteractionState::AwaitingDecision)?;
        loop {
            match surface.resolve_dependencies(&prompt).await {
                DependencyResponse::Install(names) => {
                    let mut queue = InstallQueue::new();
                    for name in &names {
                        match prompt.item(name) {
                            Some(item)
                                if item.auto_installable
                                    && item.status != ItemStatus::Installed =>
                            {
                                queue.push(item.name.clone(), item.command.clone());
                            }
                            Some(_) => debug!("Ignoring install request for {}", name),
                            None => warn!("Install requested for unknown dependency {}", name),
                        }
                    }
                    if queue.is_empty() {
                        continue;
                    }

                    interaction.advance(InteractionState::Installing)?;
                    let attempts = queue.run(&self.executor, surface).await;
                    for attempt in &attempts {
                        if let Some(item) =
                            prompt.items.iter_mut().find(|i| i.name == attempt.package)
                        {
                            item.status = match &attempt.outcome {
                                InstallOutcome::Succeeded => ItemStatus::Installed,
                                InstallOutcome::Failed(f) => ItemStatus::Failed(f.to_string()),
                            };
                        }
                    }
                    report.attempts.extend(attempts);
                    report.remaining = prompt
                        .items
                        .iter()
                        .filter(|i| i.status != ItemStatus::Installed)
                        .map(|i| i.name.clone())
                        .collect();
                    interaction.advance(InteractionState::AwaitingDecision)?;
                }
                DependencyResponse::Continue { suppress_future } => {
                    interaction.advance(InteractionState::Resolved)?;
                    if required {
                        return Ok(if prompt.all_installed() {
                            DecisionOutcome::Proceed(report)
                        } else {
                            DecisionOutcome::Decline {
                                payload: report,
                                fatal: true,
                            }
                        });
                    }
                    if suppress_future {
                        self.suppress(&suppress_key);
                        return Ok(DecisionOutcome::ProceedAndSuppressFuture(report));
                    }
                    return Ok(DecisionOutcome::Proceed(report));
                }
                DependencyResponse::Exit => {
                    interaction.advance(InteractionState::Resolved)?;
                    return Ok(DecisionOutcome::Decline {
                        payload: report,
                        fatal: required,
                    });
                }
            }
        }
    }

    /// Ask what an unrecognised executable is. The default is [`ProgramKind::Game`].
    ///
    /// Nothing is persisted: every unknown executable is classified on its own.
    pub async fn classify_unknown(
        &self,
        candidate: &ProgramCandidate,
    ) -> DecisionOutcome<ProgramClassification> {
        let default_kind = ProgramKind::default();
        let Some(surface) = self.surface.as_deref() else {
            return DecisionOutcome::Proceed(ProgramClassification::for_candidate(
                candidate,
                default_kind,
            ));
        };

        let prompt = ClassificationPrompt {
            exe_path: candidate.exe_path.clone(),
            detected_name: candidate.detected_name(),
            publisher: candidate.publisher().map(str::to_string),
            default: default_kind,
        };
        match surface.classify_program(&prompt).await {
            ClassificationResponse::Choose(kind) => DecisionOutcome::Proceed(
                ProgramClassification::for_candidate(candidate, kind),
            ),
            ClassificationResponse::AcceptDefault => DecisionOutcome::Proceed(
                ProgramClassification::for_candidate(candidate, default_kind),
            ),
            ClassificationResponse::Cancel => DecisionOutcome::Decline {
                payload: ProgramClassification::for_candidate(candidate, default_kind),
                fatal: false,
            },
        }
    }

    /// Offer a native alternative to a Windows program.
    ///
    /// `available_managers` is the set of package managers usable on this host; the
    /// first manager of the offer found in it is used for installation.
    pub async fn suggest_alternative(
        &self,
        offer: &AlternativeOffer,
        available_managers: &[ManagerId],
    ) -> Result<DecisionOutcome<AlternativeAction>> {
        let mut interaction = Interaction::new("alternative");
        let suppress_key = PreferenceKey::alternative_suggestions();

        if self.preferences.get(&suppress_key) {
            debug!("Alternative suggestions suppressed; continuing with original");
            interaction.advance(InteractionState::Resolved)?;
            return Ok(DecisionOutcome::Proceed(AlternativeAction::ContinueOriginal));
        }

        let Some(surface) = self.surface.as_deref() else {
            interaction.advance(InteractionState::Resolved)?;
            return Ok(DecisionOutcome::Deferred);
        };

        let install_options = self.install_options(offer, available_managers);
        let prompt = AlternativePrompt {
            offer: offer.clone(),
            install_options,
        };

        interaction.advance(InteractionState::AwaitingDecision)?;
        let response = surface.choose_alternative(&prompt).await;

        let suppress = response.suppress_future && response.choice != AlternativeChoice::Cancel;
        if suppress {
            self.suppress(&suppress_key);
        }
        let wrap = |action: AlternativeAction| {
            if suppress {
                DecisionOutcome::ProceedAndSuppressFuture(action)
            } else {
                DecisionOutcome::Proceed(action)
            }
        };

        let action = match response.choice {
            AlternativeChoice::Cancel => {
                interaction.advance(InteractionState::Resolved)?;
                return Ok(DecisionOutcome::Decline {
                    payload: AlternativeAction::Cancelled,
                    fatal: false,
                });
            }
            AlternativeChoice::Continue => AlternativeAction::ContinueOriginal,
            AlternativeChoice::MoreInfo => AlternativeAction::MoreInfo {
                url: offer.info_url.clone(),
            },
            AlternativeChoice::Install => match prompt.install_options.first() {
                None => AlternativeAction::ManualInstall { command: None },
                Some(option) if !option.auto_installable => AlternativeAction::ManualInstall {
                    command: Some(option.command.clone()),
                },
                Some(option) => {
                    interaction.advance(InteractionState::Installing)?;
                    let mut queue = InstallQueue::new();
                    queue.push(option.package.clone(), option.command.clone());
                    let attempt = queue.run(&self.executor, surface).await.pop();
                    match attempt.map(|a| a.outcome) {
                        Some(InstallOutcome::Succeeded) => AlternativeAction::Installed {
                            manager: option.manager.clone(),
                            package: option.package.clone(),
                            command: option.command.clone(),
                        },
                        Some(InstallOutcome::Failed(reason)) => AlternativeAction::InstallFailed {
                            manager: option.manager.clone(),
                            package: option.package.clone(),
                            command: option.command.clone(),
                            reason,
                        },
                        None => AlternativeAction::ManualInstall {
                            command: Some(option.command.clone()),
                        },
                    }
                }
            },
        };

        interaction.advance(InteractionState::Resolved)?;
        Ok(wrap(action))
    }

    /// Show a warning before launch unless its kind was opted out of.
    ///
    /// The opt-out is persisted whenever the user ticks it, whether they proceed or not.
    pub async fn gate_warning(&self, context: &WarningContext) -> WarningVerdict {
        let key = context.preference_key();
        if self.preferences.get(&key) {
            debug!("Warnings of kind '{}' suppressed", context.warning_kind);
            return WarningVerdict {
                proceed: true,
                suppress_future: false,
            };
        }

        let Some(surface) = self.surface.as_deref() else {
            return WarningVerdict {
                proceed: true,
                suppress_future: false,
            };
        };

        let prompt = WarningPrompt {
            warning_kind: context.warning_kind.clone(),
            program_name: context.program_name.clone(),
            message: context.render_message(),
            instructions: context.instructions.clone(),
            opt_out_label: context.opt_out_label(),
        };
        let response = surface.confirm_warning(&prompt).await;
        if response.suppress_future {
            self.suppress(&key);
        }
        WarningVerdict {
            proceed: response.proceed,
            suppress_future: response.suppress_future,
        }
    }

    /// Install options for `offer` usable on this host, in the offer's order
    fn install_options(
        &self,
        offer: &AlternativeOffer,
        available_managers: &[ManagerId],
    ) -> Vec<InstallOption> {
        offer
            .packages_by_manager
            .iter()
            .filter(|(manager, _)| available_managers.contains(*manager))
            .filter_map(|(manager, package)| {
                let command = self.catalog.install_command(manager, package)?;
                Some(InstallOption {
                    manager: manager.clone(),
                    package: package.clone(),
                    auto_installable: SafetyGate::is_auto_installable(&command),
                    command,
                })
            })
            .take(MAX_LISTED)
            .collect()
    }

    /// Persist an opt-out; a failed write is reported and otherwise ignored
    fn suppress(&self, key: &PreferenceKey) {
        if let Err(e) = self.preferences.set_suppressed(key) {
            warn!("Could not persist opt-out '{}': {}", key, e);
        }
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("preferences", &self.preferences)
            .field("executor", &self.executor)
            .field("headless", &self.is_headless())
            .finish_non_exhaustive()
    }
}

fn build_dependency_prompt(
    missing: &[DependencySpec],
    platform: &str,
    required: bool,
) -> DependencyPrompt {
    let items: Vec<DependencyItem> = missing
        .iter()
        .map(|dep| {
            let resolved = dep.resolve_command(platform);
            DependencyItem {
                name: dep.name.clone(),
                description: dep.description.clone(),
                auto_installable: SafetyGate::is_auto_installable(&resolved.text),
                command: resolved.text,
                command_source: resolved.source,
                benefits: if required {
                    Vec::new()
                } else {
                    dep.benefits.iter().take(MAX_LISTED).cloned().collect()
                },
                status: ItemStatus::Missing,
            }
        })
        .collect();

    let mut terminal_instructions = vec![
        "1. Open a terminal: Ctrl+Alt+T (or search for 'Terminal')".to_string(),
        "2. Copy and run these commands:".to_string(),
        String::new(),
    ];
    terminal_instructions.extend(items.iter().map(|i| format!("   {}", i.command)));
    terminal_instructions.push(String::new());
    terminal_instructions.push("3. Run hostfit again after installation".to_string());

    DependencyPrompt {
        required,
        platform: platform.to_string(),
        items,
        terminal_instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{InstallCommand, InstallEvent, InstallFailure, Spawner};
    use crate::preferences::MemoryBackend;
    use crate::program::ProgramMetadata;
    use crate::surface::{AlternativeResponse, ScriptedSurface};
    use parking_lot::Mutex;

    /// Records every command it is asked to run and runs `sh -c <script>` instead.
    ///
    /// The command's arguments are passed on, so for `sudo apt install wine` the
    /// script sees `wine` as `$3`.
    #[derive(Clone)]
    struct RecordingSpawner {
        script: String,
        commands: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSpawner {
        fn new(script: impl Into<String>) -> Self {
            Self {
                script: script.into(),
                commands: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().clone()
        }
    }

    impl Spawner for RecordingSpawner {
        fn command(&self, command: &InstallCommand) -> tokio::process::Command {
            self.commands.lock().push(command.to_shell_command());
            let mut cmd = tokio::process::Command::new("sh");
            cmd.arg("-c")
                .arg(&self.script)
                .arg("install")
                .args(&command.args)
                .stdin(std::process::Stdio::null())
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped())
                .kill_on_drop(true);
            cmd
        }
    }

    fn wine() -> DependencySpec {
        DependencySpec::new("wine", "Windows compatibility layer")
            .with_command("ubuntu", "sudo apt install wine")
    }

    fn lutris() -> DependencySpec {
        DependencySpec::new("lutris", "Game manager")
            .with_command("ubuntu", "sudo apt install lutris")
    }

    fn engine(
        backend: MemoryBackend,
        surface: &Arc<ScriptedSurface>,
        spawner: &RecordingSpawner,
    ) -> DecisionEngine {
        DecisionEngine::new(
            PolicyCatalog::builtin().unwrap(),
            PreferenceStore::load(backend),
        )
        .with_surface(Arc::clone(surface) as Arc<dyn InteractionSurface>)
        .with_executor(InstallExecutor::with_spawner(spawner.clone()))
    }

    fn headless() -> DecisionEngine {
        DecisionEngine::new(PolicyCatalog::builtin().unwrap(), PreferenceStore::in_memory())
    }

    fn drm_context() -> WarningContext {
        WarningContext::new("drm", "Foo", "{game_name} uses DRM").with_instruction("Use offline mode")
    }

    #[tokio::test]
    async fn test_install_runs_exact_command() {
        let surface = Arc::new(
            ScriptedSurface::new().answer_dependencies(DependencyResponse::Install(vec![
                "wine".to_string(),
            ])),
        );
        let spawner = RecordingSpawner::new("echo unpacking");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let outcome = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap();

        assert_eq!(spawner.commands(), vec!["sudo apt install wine".to_string()]);
        let prompts = surface.dependency_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].items[0].auto_installable);
        assert_eq!(prompts[0].items[0].command, "sudo apt install wine");
        assert_eq!(prompts[1].items[0].status, ItemStatus::Installed);

        let DecisionOutcome::Proceed(report) = outcome else {
            panic!("expected proceed, got {outcome:?}");
        };
        assert_eq!(report.installed(), vec!["wine"]);
        assert!(report.remaining.is_empty());

        let events = surface.install_events();
        assert_eq!(
            events.first(),
            Some(&("wine".to_string(), InstallEvent::Progress("installing wine".to_string())))
        );
        assert_eq!(events.last(), Some(&("wine".to_string(), InstallEvent::Succeeded)));
    }

    #[tokio::test]
    async fn test_unrelated_suppression_still_prompts() {
        let surface = Arc::new(ScriptedSurface::new());
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::with_values([("alternative_suggestions", true)]);
        let engine = engine(backend, &surface, &spawner);

        let outcome = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap();
        assert_eq!(surface.prompt_count(), 1);
        assert!(matches!(outcome, DecisionOutcome::Proceed(_)));
    }

    #[tokio::test]
    async fn test_enhancement_opt_out_is_persisted_and_honoured() {
        let surface = Arc::new(ScriptedSurface::new().answer_dependencies(
            DependencyResponse::Continue {
                suppress_future: true,
            },
        ));
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::new();
        let engine = engine(backend.clone(), &surface, &spawner);

        let first = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap();
        assert!(first.suppressed_future());
        assert_eq!(backend.snapshot().get("enhancement_suggestions"), Some(&true));

        let second = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap();
        assert!(matches!(second, DecisionOutcome::Proceed(_)));
        assert_eq!(surface.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_required_prompt_is_never_suppressed() {
        let surface = Arc::new(ScriptedSurface::new().answer_dependencies(
            DependencyResponse::Continue {
                suppress_future: true,
            },
        ));
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::with_values([("enhancement_suggestions", true)]);
        let engine = engine(backend.clone(), &surface, &spawner);

        let outcome = engine
            .evaluate_dependencies(&[wine().required()], "ubuntu", true)
            .await
            .unwrap();

        assert_eq!(surface.prompt_count(), 1);
        assert!(surface.dependency_prompts()[0].items[0].benefits.is_empty());
        assert!(outcome.is_fatal());
        assert_eq!(outcome.payload().unwrap().remaining, vec!["wine".to_string()]);
    }

    #[tokio::test]
    async fn test_required_resolves_once_installed() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_dependencies(DependencyResponse::Install(vec!["wine".to_string()]))
                .answer_dependencies(DependencyResponse::Continue {
                    suppress_future: false,
                }),
        );
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let outcome = engine
            .evaluate_dependencies(&[wine().required()], "ubuntu", true)
            .await
            .unwrap();
        assert!(matches!(outcome, DecisionOutcome::Proceed(_)));
    }

    #[tokio::test]
    async fn test_cancelled_install_reports_cancelled() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .cancelling_installs()
                .answer_dependencies(DependencyResponse::Install(vec!["wine".to_string()])),
        );
        let spawner = RecordingSpawner::new("echo started; sleep 30");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            engine.evaluate_dependencies(&[wine()], "ubuntu", false),
        )
        .await
        .expect("cancel should end the install promptly")
        .unwrap();

        let report = outcome.into_payload().unwrap();
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].outcome,
            InstallOutcome::Failed(InstallFailure::Cancelled)
        );
        assert_eq!(
            surface.dependency_prompts()[1].items[0].status,
            ItemStatus::Failed("cancelled".to_string())
        );
        assert!(!engine.executor().is_busy());
    }

    #[tokio::test]
    async fn test_installs_from_one_prompt_run_in_order_without_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log");
        let surface = Arc::new(ScriptedSurface::new().answer_dependencies(
            DependencyResponse::Install(vec!["wine".to_string(), "lutris".to_string()]),
        ));
        let spawner = RecordingSpawner::new(format!(
            "echo \"$3-start\" >> {log}; sleep 0.3; echo \"$3-end\" >> {log}",
            log = log.display()
        ));
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let report = engine
            .evaluate_dependencies(&[wine(), lutris()], "ubuntu", false)
            .await
            .unwrap()
            .into_payload()
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&log).unwrap().lines().collect::<Vec<_>>(),
            vec!["wine-start", "wine-end", "lutris-start", "lutris-end"]
        );
        assert_eq!(report.installed(), vec!["wine", "lutris"]);
        assert!(report.remaining.is_empty());
        let prompts = surface.dependency_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].items.iter().all(|i| i.status == ItemStatus::Installed));
    }

    #[tokio::test]
    async fn test_failed_install_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let attempted = dir.path().join("attempted");
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_dependencies(DependencyResponse::Install(vec!["wine".to_string()]))
                .answer_dependencies(DependencyResponse::Install(vec!["wine".to_string()]))
                .answer_dependencies(DependencyResponse::Continue {
                    suppress_future: false,
                }),
        );
        let spawner = RecordingSpawner::new(format!(
            "if [ -e {flag} ]; then exit 0; fi; touch {flag}; echo 'E: mirror unreachable' >&2; exit 100",
            flag = attempted.display()
        ));
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let outcome = engine
            .evaluate_dependencies(&[wine().required()], "ubuntu", true)
            .await
            .unwrap();

        assert_eq!(spawner.commands().len(), 2);
        let prompts = surface.dependency_prompts();
        assert_eq!(
            prompts[1].items[0].status,
            ItemStatus::Failed("installation exited with status 100: E: mirror unreachable".to_string())
        );
        assert_eq!(prompts[2].items[0].status, ItemStatus::Installed);
        let DecisionOutcome::Proceed(report) = outcome else {
            panic!("expected proceed, got {outcome:?}");
        };
        assert_eq!(report.attempts.len(), 2);
        assert_eq!(report.installed(), vec!["wine"]);
    }

    #[tokio::test]
    async fn test_each_queued_install_is_cancelled_on_its_own() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .cancelling_installs()
                .answer_dependencies(DependencyResponse::Install(vec![
                    "wine".to_string(),
                    "lutris".to_string(),
                ])),
        );
        let spawner = RecordingSpawner::new("echo started; sleep 30");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        let report = tokio::time::timeout(
            std::time::Duration::from_secs(20),
            engine.evaluate_dependencies(&[wine(), lutris()], "ubuntu", false),
        )
        .await
        .unwrap()
        .unwrap()
        .into_payload()
        .unwrap();

        let packages: Vec<_> = report.attempts.iter().map(|a| a.package.as_str()).collect();
        assert_eq!(packages, vec!["wine", "lutris"]);
        assert!(report
            .attempts
            .iter()
            .all(|a| a.outcome == InstallOutcome::Failed(InstallFailure::Cancelled)));
        let lutris_events: Vec<_> = surface
            .install_events()
            .into_iter()
            .filter(|(package, _)| package == "lutris")
            .map(|(_, event)| event)
            .collect();
        assert_eq!(
            lutris_events.first(),
            Some(&InstallEvent::Progress("installing lutris".to_string()))
        );
        assert!(!engine.executor().is_busy());
    }

    #[tokio::test]
    async fn test_busy_executor_rejects_install() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_dependencies(DependencyResponse::Install(vec!["wine".to_string()])),
        );
        let spawner = RecordingSpawner::new("sleep 5");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);
        let other = engine
            .executor()
            .start("sudo apt install lutris", "lutris")
            .unwrap();

        let report = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap()
            .into_payload()
            .unwrap();
        assert!(matches!(
            report.attempts[0].outcome,
            InstallOutcome::Failed(InstallFailure::Rejected(_))
        ));
        assert!(!spawner.commands().contains(&"sudo apt install wine".to_string()));
        other.cancel();
    }

    #[tokio::test]
    async fn test_unresolved_command_is_manual_only() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_dependencies(DependencyResponse::Install(vec!["foo".to_string()])),
        );
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);

        engine
            .evaluate_dependencies(&[DependencySpec::new("foo", "Foo tool")], "ubuntu", false)
            .await
            .unwrap();

        let item = &surface.dependency_prompts()[0].items[0];
        assert_eq!(item.command, "# Please install foo");
        assert!(!item.auto_installable);
        assert!(spawner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_empty_dependency_set_is_an_error() {
        let err = headless()
            .evaluate_dependencies(&[], "ubuntu", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyDependencySet));
    }

    #[test]
    fn test_terminal_guide_lists_commands() {
        let prompt = build_dependency_prompt(
            &[wine(), DependencySpec::new("foo", "Foo tool")],
            "ubuntu",
            false,
        );
        assert_eq!(
            prompt.terminal_instructions[3..5],
            ["   sudo apt install wine".to_string(), "   # Please install foo".to_string()]
        );
        assert_eq!(
            prompt.terminal_instructions.last().map(String::as_str),
            Some("3. Run hostfit again after installation")
        );
    }

    #[tokio::test]
    async fn test_headless_defaults() {
        let engine = headless();
        let required = engine
            .evaluate_dependencies(&[wine().required()], "ubuntu", true)
            .await
            .unwrap();
        assert!(required.is_fatal());

        let optional = engine
            .evaluate_dependencies(&[wine()], "ubuntu", false)
            .await
            .unwrap();
        assert!(matches!(optional, DecisionOutcome::Decline { fatal: false, .. }));

        let offer = engine.catalog().alternative_offer("photoshop").unwrap();
        let alternative = engine
            .suggest_alternative(&offer, &["apt".to_string()])
            .await
            .unwrap();
        assert_eq!(alternative, DecisionOutcome::Deferred);

        assert_eq!(engine.gate_warning(&drm_context()).await.as_tuple(), (true, false));
        assert!(engine.preferences().suppressed().is_empty());
    }

    #[tokio::test]
    async fn test_warning_opt_out_flow() {
        let surface = Arc::new(ScriptedSurface::new().answer_warning(true, true));
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::new();
        let engine = engine(backend.clone(), &surface, &spawner);

        let first = engine.gate_warning(&drm_context()).await;
        assert_eq!(first.as_tuple(), (true, true));
        let prompt = &surface.warning_prompts()[0];
        assert_eq!(prompt.message, "Foo uses DRM");
        assert_eq!(prompt.opt_out_label, "Don't show drm warnings again");
        assert_eq!(backend.snapshot().get("drm_warnings"), Some(&true));

        let second = engine.gate_warning(&drm_context()).await;
        assert_eq!(second.as_tuple(), (true, false));
        assert_eq!(surface.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_warning_decline_keeps_opt_out() {
        let surface = Arc::new(ScriptedSurface::new().answer_warning(false, true));
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::new();
        let engine = engine(backend.clone(), &surface, &spawner);

        assert_eq!(engine.gate_warning(&drm_context()).await.as_tuple(), (false, true));
        assert_eq!(backend.snapshot().get("drm_warnings"), Some(&true));
    }

    #[tokio::test]
    async fn test_classification_defaults_to_game() {
        let candidate = ProgramCandidate::new(
            "/games/setup.exe",
            ProgramMetadata {
                product_name: Some("Space Game".to_string()),
                company_name: Some("Acme".to_string()),
            },
        );

        let surface = Arc::new(ScriptedSurface::new());
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);
        let outcome = engine.classify_unknown(&candidate).await;
        let classification = outcome.into_payload().unwrap();
        assert_eq!(classification.kind, ProgramKind::Game);
        assert_eq!(classification.display_name, "Space Game");

        let prompt = &surface.classification_prompts()[0];
        assert_eq!(prompt.publisher.as_deref(), Some("Acme"));
        assert_eq!(prompt.default, ProgramKind::Game);

        let headless = headless().classify_unknown(&candidate).await;
        assert_eq!(headless.payload().map(|c| c.kind), Some(ProgramKind::Game));
    }

    #[tokio::test]
    async fn test_classification_choice_is_not_remembered() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_classification(ClassificationResponse::Choose(ProgramKind::Application)),
        );
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);
        let candidate = ProgramCandidate::new("/apps/tool.exe", ProgramMetadata::default());

        let first = engine.classify_unknown(&candidate).await;
        assert_eq!(first.payload().map(|c| c.kind), Some(ProgramKind::Application));
        let second = engine.classify_unknown(&candidate).await;
        assert_eq!(second.payload().map(|c| c.kind), Some(ProgramKind::Game));
        assert_eq!(surface.prompt_count(), 2);
        assert!(engine.preferences().suppressed().is_empty());
    }

    #[tokio::test]
    async fn test_alternative_install_uses_available_manager() {
        let surface = Arc::new(
            ScriptedSurface::new().answer_alternative(AlternativeResponse::new(
                AlternativeChoice::Install,
            )),
        );
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);
        let offer = engine.catalog().alternative_offer("photoshop").unwrap();

        let outcome = engine
            .suggest_alternative(&offer, &["apt".to_string()])
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DecisionOutcome::Proceed(AlternativeAction::Installed {
                manager: "apt".to_string(),
                package: "gimp".to_string(),
                command: "sudo apt install gimp".to_string(),
            })
        );
        assert_eq!(spawner.commands(), vec!["sudo apt install gimp".to_string()]);
        assert_eq!(surface.alternative_prompts()[0].install_options.len(), 1);
    }

    #[tokio::test]
    async fn test_alternative_install_falls_back_to_manual() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_alternative(AlternativeResponse::new(AlternativeChoice::Install))
                .answer_alternative(AlternativeResponse::new(AlternativeChoice::Install)),
        );
        let spawner = RecordingSpawner::new("true");
        let engine = engine(MemoryBackend::new(), &surface, &spawner);
        let offer = engine.catalog().alternative_offer("photoshop").unwrap();

        let unlisted = engine.suggest_alternative(&offer, &[]).await.unwrap();
        assert_eq!(
            unlisted,
            DecisionOutcome::Proceed(AlternativeAction::ManualInstall { command: None })
        );

        let dnf = engine
            .suggest_alternative(&offer, &["dnf".to_string()])
            .await
            .unwrap();
        assert_eq!(
            dnf,
            DecisionOutcome::Proceed(AlternativeAction::ManualInstall {
                command: Some("sudo dnf install gimp".to_string()),
            })
        );
        assert!(spawner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_alternative_opt_out_and_cancel() {
        let surface = Arc::new(
            ScriptedSurface::new()
                .answer_alternative(AlternativeResponse::suppressing(AlternativeChoice::Cancel))
                .answer_alternative(AlternativeResponse::suppressing(AlternativeChoice::MoreInfo)),
        );
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::new();
        let engine = engine(backend.clone(), &surface, &spawner);
        let offer = engine.catalog().alternative_offer("photoshop").unwrap();

        let cancelled = engine.suggest_alternative(&offer, &[]).await.unwrap();
        assert_eq!(
            cancelled,
            DecisionOutcome::Decline {
                payload: AlternativeAction::Cancelled,
                fatal: false,
            }
        );
        assert!(backend.snapshot().is_empty());

        let info = engine.suggest_alternative(&offer, &[]).await.unwrap();
        assert_eq!(
            info,
            DecisionOutcome::ProceedAndSuppressFuture(AlternativeAction::MoreInfo {
                url: offer.info_url.clone(),
            })
        );
        assert_eq!(backend.snapshot().get("alternative_suggestions"), Some(&true));

        let silent = engine.suggest_alternative(&offer, &[]).await.unwrap();
        assert_eq!(
            silent,
            DecisionOutcome::Proceed(AlternativeAction::ContinueOriginal)
        );
        assert_eq!(surface.prompt_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_persistence_still_suppresses_in_memory() {
        let surface = Arc::new(ScriptedSurface::new().answer_warning(true, true));
        let spawner = RecordingSpawner::new("true");
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let engine = engine(backend.clone(), &surface, &spawner);

        assert_eq!(engine.gate_warning(&drm_context()).await.as_tuple(), (true, true));
        assert!(backend.snapshot().is_empty());
        assert_eq!(engine.gate_warning(&drm_context()).await.as_tuple(), (true, false));
        assert_eq!(surface.prompt_count(), 1);
    }
}
