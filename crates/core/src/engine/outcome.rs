use crate::catalog::{ManagerId, PackageId};
use crate::executor::{InstallFailure, InstallOutcome};
use serde::Serialize;

/// Result of every engine entry point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum DecisionOutcome<T> {
    Proceed(T),
    /// Proceed, and the user opted out of this class of prompts
    ProceedAndSuppressFuture(T),
    /// The user declined; `fatal` means the caller must halt
    Decline { payload: T, fatal: bool },
    /// No decision could be collected; continue without changing anything
    Deferred,
}

impl<T> DecisionOutcome<T> {
    pub fn should_proceed(&self) -> bool {
        !matches!(self, DecisionOutcome::Decline { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DecisionOutcome::Decline { fatal: true, .. })
    }

    pub fn suppressed_future(&self) -> bool {
        matches!(self, DecisionOutcome::ProceedAndSuppressFuture(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            DecisionOutcome::Proceed(p)
            | DecisionOutcome::ProceedAndSuppressFuture(p)
            | DecisionOutcome::Decline { payload: p, .. } => Some(p),
            DecisionOutcome::Deferred => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            DecisionOutcome::Proceed(p)
            | DecisionOutcome::ProceedAndSuppressFuture(p)
            | DecisionOutcome::Decline { payload: p, .. } => Some(p),
            DecisionOutcome::Deferred => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecisionOutcome::Proceed(_) => "proceed",
            DecisionOutcome::ProceedAndSuppressFuture(_) => "proceed_and_suppress_future",
            DecisionOutcome::Decline { fatal: true, .. } => "decline_fatal",
            DecisionOutcome::Decline { .. } => "decline",
            DecisionOutcome::Deferred => "deferred",
        }
    }
}

/// One install run on the user's behalf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallAttempt {
    pub package: String,
    pub command: String,
    pub outcome: InstallOutcome,
}

/// What happened to a set of missing dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub platform: String,
    pub attempts: Vec<InstallAttempt>,
    /// Dependencies still missing when the interaction ended
    pub remaining: Vec<String>,
}

impl DependencyReport {
    pub fn installed(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.outcome.is_success())
            .map(|a| a.package.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<&InstallAttempt> {
        self.attempts
            .iter()
            .filter(|a| !a.outcome.is_success())
            .collect()
    }
}

/// What the user did with a suggested native alternative
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AlternativeAction {
    Installed {
        manager: ManagerId,
        package: PackageId,
        command: String,
    },
    InstallFailed {
        manager: ManagerId,
        package: PackageId,
        command: String,
        reason: InstallFailure,
    },
    /// Install was chosen but nothing can be run automatically here
    ManualInstall { command: Option<String> },
    ContinueOriginal,
    MoreInfo { url: Option<String> },
    Cancelled,
}

/// Answer of the warning gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarningVerdict {
    pub proceed: bool,
    pub suppress_future: bool,
}

impl WarningVerdict {
    pub fn as_tuple(self) -> (bool, bool) {
        (self.proceed, self.suppress_future)
    }
}
