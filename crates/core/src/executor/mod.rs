//! Background execution of install commands
//!
//! An [`InstallExecutor`] owns at most one job at a time. Each job runs its command
//! as a single external process on a tokio task and reports through a channel of
//! [`InstallEvent`]s: progress notifications followed by exactly one terminal event.
//!
//! The process runs in its own process group. Cancelling signals the whole group,
//! and the terminal event is only sent once the process has been reaped.

mod command;
mod job;
mod process;
mod spawner;

pub use command::InstallCommand;
pub use job::{InstallEvent, InstallFailure, InstallJob, InstallOutcome, JobState};
pub use spawner::{Spawner, SystemSpawner};

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle as TaskHandle;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 64;

/// Time between SIGTERM and SIGKILL when cancelling
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct Slot {
    id: u64,
    job: InstallJob,
}

type SharedSlot = Arc<Mutex<Option<Slot>>>;

#[derive(Clone)]
pub struct InstallExecutor {
    spawner: Arc<dyn Spawner>,
    slot: SharedSlot,
    next_id: Arc<AtomicU64>,
    grace: Duration,
}

impl Default for InstallExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallExecutor {
    pub fn new() -> Self {
        Self::with_spawner(SystemSpawner)
    }

    pub fn with_spawner(spawner: impl Spawner + 'static) -> Self {
        Self {
            spawner: Arc::new(spawner),
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
            grace: DEFAULT_GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// The job whose outcome has not been observed yet, if any
    pub fn current_job(&self) -> Option<InstallJob> {
        self.slot.lock().as_ref().map(|s| s.job.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|s| s.job.state.is_active())
    }

    /// Start `command` for `package_name` on a worker task.
    ///
    /// Fails with [`Error::JobAlreadyRunning`] while another job is active, leaving
    /// that job untouched. Must be called from within a tokio runtime.
    pub fn start(&self, command: &str, package_name: &str) -> Result<JobHandle> {
        let id = {
            let mut slot = self.slot.lock();
            if let Some(active) = slot.as_ref().filter(|s| s.job.state.is_active()) {
                debug!(
                    "Rejecting install of {} while {} is {}",
                    package_name,
                    active.job.package_name,
                    active.job.state.name()
                );
                return Err(Error::JobAlreadyRunning {
                    package: active.job.package_name.clone(),
                });
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            *slot = Some(Slot {
                id,
                job: InstallJob {
                    command: command.to_string(),
                    package_name: package_name.to_string(),
                    state: JobState::Pending,
                },
            });
            id
        };

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let worker = Worker {
            id,
            command: command.to_string(),
            package_name: package_name.to_string(),
            spawner: Arc::clone(&self.spawner),
            slot: Arc::clone(&self.slot),
            grace: self.grace,
            events: event_tx,
            cancel: cancel_rx,
        };
        tokio::spawn(worker.run());

        Ok(JobHandle {
            id,
            command: command.to_string(),
            package_name: package_name.to_string(),
            events: event_rx,
            canceller: JobCanceller(Arc::new(cancel_tx)),
            slot: Arc::clone(&self.slot),
            finished: false,
        })
    }
}

impl std::fmt::Debug for InstallExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallExecutor")
            .field("current_job", &self.current_job())
            .finish_non_exhaustive()
    }
}

/// Requests cancellation of one job; cheap to clone
#[derive(Debug, Clone)]
pub struct JobCanceller(Arc<watch::Sender<bool>>);

impl JobCanceller {
    /// Advisory: a no-op once the job has reached a terminal state
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Caller side of a running job
#[derive(Debug)]
pub struct JobHandle {
    id: u64,
    command: String,
    package_name: String,
    events: mpsc::Receiver<InstallEvent>,
    canceller: JobCanceller,
    slot: SharedSlot,
    finished: bool,
}

impl JobHandle {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> JobCanceller {
        self.canceller.clone()
    }

    /// Next notification; `None` once the terminal event has been returned
    pub async fn next_event(&mut self) -> Option<InstallEvent> {
        if self.finished {
            return None;
        }
        match self.events.recv().await {
            Some(event) => {
                if event.is_terminal() {
                    self.release();
                }
                Some(event)
            }
            None => {
                self.release();
                Some(InstallEvent::Failed(InstallFailure::Spawn(
                    "install worker stopped unexpectedly".to_string(),
                )))
            }
        }
    }

    /// Drain remaining notifications and return the terminal outcome
    pub async fn wait(mut self) -> InstallOutcome {
        while let Some(event) = self.next_event().await {
            match event {
                InstallEvent::Progress(_) => {}
                InstallEvent::Succeeded => return InstallOutcome::Succeeded,
                InstallEvent::Failed(f) => return InstallOutcome::Failed(f),
            }
        }
        InstallOutcome::Failed(InstallFailure::Spawn(
            "install outcome already observed".to_string(),
        ))
    }

    /// The outcome has been delivered: the executor forgets the job
    fn release(&mut self) {
        self.finished = true;
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|s| s.id == self.id) {
            *slot = None;
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        if !self.finished {
            self.canceller.cancel();
        }
    }
}

struct Worker {
    id: u64,
    command: String,
    package_name: String,
    spawner: Arc<dyn Spawner>,
    slot: SharedSlot,
    grace: Duration,
    events: mpsc::Sender<InstallEvent>,
    cancel: watch::Receiver<bool>,
}

impl Worker {
    async fn run(mut self) {
        self.set_state(JobState::Running);
        info!("Installing {}: {}", self.package_name, self.command);
        let _ = self
            .events
            .send(InstallEvent::Progress(format!(
                "installing {}",
                self.package_name
            )))
            .await;

        let outcome = self.execute().await;
        match &outcome {
            InstallOutcome::Succeeded => info!("Installed {}", self.package_name),
            InstallOutcome::Failed(reason) => {
                warn!("Installation of {} failed: {}", self.package_name, reason)
            }
        }

        self.set_state(outcome.to_state());
        let _ = self.events.send(outcome.to_event()).await;
    }

    async fn execute(&mut self) -> InstallOutcome {
        let Some(command) = InstallCommand::parse(&self.command) else {
            return InstallOutcome::Failed(InstallFailure::Spawn(
                "empty install command".to_string(),
            ));
        };

        if let Some(preflight) = self.spawner.preflight(&command) {
            if let Some(failed) = self.run_preflight(preflight).await {
                return failed;
            }
        }

        if *self.cancel.borrow() {
            return InstallOutcome::Failed(InstallFailure::Cancelled);
        }

        let mut builder = self.spawner.command(&command);
        process::isolate(&mut builder);
        let mut child = match builder.spawn() {
            Ok(child) => child,
            Err(e) => {
                return InstallOutcome::Failed(InstallFailure::Spawn(format!(
                    "failed to start {}: {e}",
                    command.program
                )));
            }
        };
        let group = child.id();

        let mut forward = child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward_lines(out, self.events.clone())));
        let mut stderr_tail = child.stderr.take().map(|err| tokio::spawn(last_line(err)));

        let status = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancelled(&mut self.cancel) => None,
        };
        let Some(status) = status else {
            process::terminate(&mut child, group, self.grace).await;
            abort(forward, stderr_tail);
            return InstallOutcome::Failed(InstallFailure::Cancelled);
        };

        // A leftover process in the group can hold the pipes open after the leader exits
        let detail = tokio::select! {
            detail = drain(&mut forward, &mut stderr_tail) => Some(detail),
            _ = cancelled(&mut self.cancel) => None,
        };
        let Some(detail) = detail else {
            process::terminate(&mut child, group, self.grace).await;
            abort(forward, stderr_tail);
            return InstallOutcome::Failed(InstallFailure::Cancelled);
        };

        match status {
            Ok(status) if status.success() => InstallOutcome::Succeeded,
            Ok(status) => InstallOutcome::Failed(InstallFailure::ExitStatus {
                code: status.code(),
                detail,
            }),
            Err(e) => InstallOutcome::Failed(InstallFailure::Spawn(format!(
                "failed waiting for {}: {e}",
                command.program
            ))),
        }
    }

    /// Runs `preflight` in the foreground; `Some` carries the outcome if the job must stop
    async fn run_preflight(
        &mut self,
        mut preflight: tokio::process::Command,
    ) -> Option<InstallOutcome> {
        let mut child = match preflight.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Some(InstallOutcome::Failed(InstallFailure::Spawn(format!(
                    "failed to obtain credentials: {e}"
                ))));
            }
        };
        let status = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancelled(&mut self.cancel) => None,
        };
        match status {
            None => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop credential prompt: {}", e);
                }
                Some(InstallOutcome::Failed(InstallFailure::Cancelled))
            }
            Some(Ok(status)) if status.success() => None,
            Some(Ok(status)) => Some(InstallOutcome::Failed(InstallFailure::ExitStatus {
                code: status.code(),
                detail: Some("could not obtain administrator credentials".to_string()),
            })),
            Some(Err(e)) => Some(InstallOutcome::Failed(InstallFailure::Spawn(format!(
                "failed waiting for credential prompt: {e}"
            )))),
        }
    }

    fn set_state(&self, state: JobState) {
        let mut slot = self.slot.lock();
        if let Some(s) = slot.as_mut().filter(|s| s.id == self.id) {
            debug!(
                "Install job {} ({}): {} -> {}",
                self.id,
                self.package_name,
                s.job.state.name(),
                state.name()
            );
            s.job.state = state;
        }
    }
}

/// Resolves once cancellation is requested or every canceller is gone
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Waits for both output readers; the stderr reader yields the last stderr line
async fn drain(
    forward: &mut Option<TaskHandle<()>>,
    stderr_tail: &mut Option<TaskHandle<Option<String>>>,
) -> Option<String> {
    if let Some(task) = forward {
        let _ = task.await;
    }
    match stderr_tail {
        Some(task) => task.await.ok().flatten(),
        None => None,
    }
}

fn abort(forward: Option<TaskHandle<()>>, stderr_tail: Option<TaskHandle<Option<String>>>) {
    if let Some(task) = forward {
        task.abort();
    }
    if let Some(task) = stderr_tail {
        task.abort();
    }
}

async fn forward_lines(out: impl AsyncRead + Unpin, events: mpsc::Sender<InstallEvent>) {
    let mut lines = BufReader::new(out).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if events
            .send(InstallEvent::Progress(line.to_string()))
            .await
            .is_err()
        {
            break;
        }
    }
}

async fn last_line(err: impl AsyncRead + Unpin) -> Option<String> {
    let mut lines = BufReader::new(err).lines();
    let mut last = None;
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if !line.is_empty() {
            last = Some(line.to_string());
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Runs `sh -c <script>` in place of whatever the job asked for
    struct ScriptSpawner {
        script: String,
        preflight: Option<&'static str>,
    }

    impl ScriptSpawner {
        fn new(script: impl Into<String>) -> Self {
            Self {
                script: script.into(),
                preflight: None,
            }
        }

        fn with_preflight(mut self, script: &'static str) -> Self {
            self.preflight = Some(script);
            self
        }
    }

    fn sh(script: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    impl Spawner for ScriptSpawner {
        fn command(&self, _command: &InstallCommand) -> tokio::process::Command {
            sh(&self.script)
        }

        fn preflight(&self, _command: &InstallCommand) -> Option<tokio::process::Command> {
            self.preflight.map(sh)
        }
    }

    async fn collect(mut handle: JobHandle) -> Vec<InstallEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        events
    }

    /// `sh` wrapping a second `sh` that writes `marker` once its work is done, the
    /// way sudo wraps the package manager
    fn wrapped_worker(marker: &Path, wrapper_prelude: &str) -> String {
        format!(
            "{wrapper_prelude} echo started; sh -c 'sleep 2; touch {}'; true",
            marker.display()
        )
    }

    #[tokio::test]
    async fn test_success_emits_progress_then_succeeded() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new("echo fetching; echo done"));
        let handle = executor.start("sudo apt install wine", "wine").unwrap();
        let events = collect(handle).await;

        assert_eq!(
            events,
            vec![
                InstallEvent::Progress("installing wine".to_string()),
                InstallEvent::Progress("fetching".to_string()),
                InstallEvent::Progress("done".to_string()),
                InstallEvent::Succeeded,
            ]
        );
        assert!(executor.current_job().is_none());
    }

    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new(
            "echo 'E: no such package' >&2; exit 100",
        ));
        let outcome = executor.start("sudo apt install nope", "nope").unwrap().wait().await;
        assert_eq!(
            outcome,
            InstallOutcome::Failed(InstallFailure::ExitStatus {
                code: Some(100),
                detail: Some("E: no such package".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported_as_data() {
        let executor = InstallExecutor::new();
        let outcome = executor
            .start("hostfit-definitely-not-a-program --install", "ghost")
            .unwrap()
            .wait()
            .await;
        match outcome {
            InstallOutcome::Failed(InstallFailure::Spawn(msg)) => {
                assert!(msg.contains("hostfit-definitely-not-a-program"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_preflight_skips_install() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("installed");
        let executor = InstallExecutor::with_spawner(
            ScriptSpawner::new(format!("touch {}", marker.display())).with_preflight("exit 1"),
        );

        let outcome = executor.start("sudo apt install wine", "wine").unwrap().wait().await;
        assert_eq!(
            outcome,
            InstallOutcome::Failed(InstallFailure::ExitStatus {
                code: Some(1),
                detail: Some("could not obtain administrator credentials".to_string()),
            })
        );
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_running() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new("sleep 5"));
        let first = executor.start("sudo apt install wine", "wine").unwrap();

        let err = executor.start("sudo apt install lutris", "lutris").unwrap_err();
        assert!(matches!(err, Error::JobAlreadyRunning { ref package } if package == "wine"));

        let job = executor.current_job().unwrap();
        assert_eq!(job.package_name, "wine");
        assert_eq!(job.command, "sudo apt install wine");
        assert!(job.state.is_active());

        first.cancel();
        assert_eq!(
            first.wait().await,
            InstallOutcome::Failed(InstallFailure::Cancelled)
        );
        assert!(!executor.is_busy());
        assert!(executor.start("sudo apt install lutris", "lutris").is_ok());
    }

    #[tokio::test]
    async fn test_cancel_terminates_process() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new("echo started; sleep 30"));
        let mut handle = executor.start("sudo pacman -S wine", "wine").unwrap();

        assert_eq!(
            handle.next_event().await,
            Some(InstallEvent::Progress("installing wine".to_string()))
        );
        handle.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .expect("cancellation should not wait for the process to finish");
        assert_eq!(outcome, InstallOutcome::Failed(InstallFailure::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_reaches_processes_started_by_the_install() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("installed");
        let executor =
            InstallExecutor::with_spawner(ScriptSpawner::new(wrapped_worker(&marker, "")));
        let mut handle = executor.start("sudo apt install wine", "wine").unwrap();

        assert_eq!(
            handle.next_event().await,
            Some(InstallEvent::Progress("installing wine".to_string()))
        );
        assert_eq!(
            handle.next_event().await,
            Some(InstallEvent::Progress("started".to_string()))
        );
        handle.cancel();
        assert!(executor.is_busy());

        let outcome = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .unwrap();
        assert_eq!(outcome, InstallOutcome::Failed(InstallFailure::Cancelled));
        assert!(!executor.is_busy());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "inner install kept running after cancel");
    }

    #[tokio::test]
    async fn test_cancel_escalates_when_term_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("installed");
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new(wrapped_worker(
            &marker,
            "trap '' TERM;",
        )))
        .with_grace_period(Duration::from_millis(200));
        let mut handle = executor.start("sudo apt install wine", "wine").unwrap();

        handle.next_event().await;
        assert_eq!(
            handle.next_event().await,
            Some(InstallEvent::Progress("started".to_string()))
        );
        handle.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .unwrap();
        assert_eq!(outcome, InstallOutcome::Failed(InstallFailure::Cancelled));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "inner install survived SIGKILL");
    }

    #[tokio::test]
    async fn test_cancel_while_leftover_process_holds_output() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new(
            "echo started; sleep 30 & exit 0",
        ));
        let mut handle = executor.start("sudo apt install wine", "wine").unwrap();

        handle.next_event().await;
        assert_eq!(
            handle.next_event().await,
            Some(InstallEvent::Progress("started".to_string()))
        );
        handle.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .expect("cancel should not wait for the leftover process");
        assert_eq!(outcome, InstallOutcome::Failed(InstallFailure::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_after_terminal_is_noop() {
        let executor = InstallExecutor::with_spawner(ScriptSpawner::new("true"));
        let mut handle = executor.start("sudo apt install wine", "wine").unwrap();
        let canceller = handle.canceller();

        let mut last = None;
        while let Some(event) = handle.next_event().await {
            last = Some(event);
        }
        canceller.cancel();
        assert_eq!(last, Some(InstallEvent::Succeeded));
        assert_eq!(handle.next_event().await, None);
    }
}
