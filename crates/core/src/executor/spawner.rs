use super::InstallCommand;
use std::process::Stdio;
use tokio::process::Command;

/// Builds the external processes for an install job.
///
/// The executor spawns what is returned here. The install itself is moved into a
/// process group of its own before spawning.
pub trait Spawner: Send + Sync {
    fn command(&self, command: &InstallCommand) -> Command;

    /// Run in the terminal's foreground before the install, e.g. to prompt for a password
    fn preflight(&self, _command: &InstallCommand) -> Option<Command> {
        None
    }
}

/// Runs the command as given
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn command(&self, command: &InstallCommand) -> Command {
        tracing::debug!("Spawning: {}", command.to_shell_command());
        command.to_tokio_command()
    }

    fn preflight(&self, command: &InstallCommand) -> Option<Command> {
        if !command.needs_credentials() {
            return None;
        }
        let mut cmd = Command::new("sudo");
        cmd.arg("-v")
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        Some(cmd)
    }
}
