use serde::Serialize;

/// Why an install job did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InstallFailure {
    #[error("cancelled")]
    Cancelled,

    #[error("{}", exit_message(.code, .detail))]
    ExitStatus {
        code: Option<i32>,
        detail: Option<String>,
    },

    #[error("{0}")]
    Spawn(String),

    #[error("{0}")]
    Rejected(String),
}

fn exit_message(code: &Option<i32>, detail: &Option<String>) -> String {
    let head = match code {
        Some(code) => format!("installation exited with status {code}"),
        None => "installation was terminated by a signal".to_string(),
    };
    match detail {
        Some(detail) => format!("{head}: {detail}"),
        None => head,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed(InstallFailure),
}

impl JobState {
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Running)
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed(_) => "failed",
        }
    }
}

/// Snapshot of the job an executor currently owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallJob {
    pub command: String,
    pub package_name: String,
    pub state: JobState,
}

/// Notifications emitted by a job, in order: progress first, then exactly one terminal event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    Progress(String),
    Succeeded,
    Failed(InstallFailure),
}

impl InstallEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InstallEvent::Progress(_))
    }
}

/// Terminal result of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum InstallOutcome {
    Succeeded,
    Failed(InstallFailure),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Succeeded)
    }

    pub(crate) fn to_event(&self) -> InstallEvent {
        match self {
            InstallOutcome::Succeeded => InstallEvent::Succeeded,
            InstallOutcome::Failed(f) => InstallEvent::Failed(f.clone()),
        }
    }

    pub(crate) fn to_state(&self) -> JobState {
        match self {
            InstallOutcome::Succeeded => JobState::Succeeded,
            InstallOutcome::Failed(f) => JobState::Failed(f.clone()),
        }
    }
}
