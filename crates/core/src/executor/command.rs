use std::path::PathBuf;
use std::process::Stdio;

/// An install command split into program and arguments.
///
/// Commands are never handed to a shell; the string is split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl InstallCommand {
    /// Split `command` into program and arguments; `None` for a blank string
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            working_dir: None,
            env: Vec::new(),
        })
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }

    /// Whether running the command first needs cached sudo credentials
    pub fn needs_credentials(&self) -> bool {
        self.program == "sudo"
    }

    /// Process builder with stdout/stderr piped and the child killed on drop.
    ///
    /// Stdin is closed: the install runs outside the terminal's foreground group.
    pub fn to_tokio_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_whitespace() {
        let cmd = InstallCommand::parse("  sudo   apt install wine ").unwrap();
        assert_eq!(cmd.program, "sudo");
        assert_eq!(cmd.args, vec!["apt", "install", "wine"]);
        assert_eq!(cmd.to_shell_command(), "sudo apt install wine");
        assert!(cmd.needs_credentials());
        assert!(!InstallCommand::parse("flatpak install flathub org.gimp.GIMP")
            .unwrap()
            .needs_credentials());
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert!(InstallCommand::parse("").is_none());
        assert!(InstallCommand::parse(" \t ").is_none());
    }

    #[test]
    fn test_shell_rendering_quotes_spaces() {
        let mut cmd = InstallCommand::parse("echo").unwrap();
        cmd.args.push("two words".to_string());
        assert_eq!(cmd.to_shell_command(), "echo 'two words'");
    }
}
