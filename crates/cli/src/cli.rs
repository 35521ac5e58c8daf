use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::{
    Session, catalog_command, check_command, deps_command, inspect_command, prefs_command,
    warn_command,
};

/// Decide what to install, suggest or warn about before launching a Windows program
#[derive(Parser, Debug)]
#[command(name = "hostfit")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug         Enable debug logging\n    HOSTFIT_CONFIG=<path>  Settings file\n    HOSTFIT_PLATFORM=<id>  Override platform detection\n    HOSTFIT_HEADLESS=1     Never prompt")]
pub struct Cli {
    /// Never prompt; apply the default decision for every question
    #[arg(long, global = true)]
    pub headless: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look for missing catalog dependencies and offer to install them
    Check {
        /// Only evaluate required dependencies
        #[arg(long)]
        required_only: bool,
    },
    /// Evaluate the named dependencies as if they were missing
    Deps {
        /// Dependency names from the catalog
        #[arg(required = true)]
        names: Vec<String>,

        /// Treat them as required
        #[arg(long)]
        required: bool,
    },
    /// Run the pre-launch decisions for an executable
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to the Windows executable
        exe: PathBuf,
    },
    /// Show one warning through the warning gate
    Warn {
        /// Warning kind from the catalog (e.g. drm)
        kind: String,

        /// Program name shown in the message
        program: String,
    },
    /// List prompts the user opted out of
    Prefs,
    /// Validate a catalog and print a summary
    Catalog {
        /// Catalog file to check instead of the configured one
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the command
    pub async fn execute(self) -> Result<ExitCode> {
        let config = self.config.as_deref();
        match self.command {
            Commands::Catalog { file } => {
                catalog_command(file.as_deref(), config)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Prefs => {
                let session = Session::open(config, true)?;
                prefs_command(&session)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Check { required_only } => {
                let session = Session::open(config, self.headless)?;
                check_command(&session, required_only).await
            }
            Commands::Deps { names, required } => {
                let session = Session::open(config, self.headless)?;
                deps_command(&session, &names, required).await
            }
            Commands::Inspect { exe } => {
                let session = Session::open(config, self.headless)?;
                inspect_command(&session, &exe).await
            }
            Commands::Warn { kind, program } => {
                let session = Session::open(config, self.headless)?;
                warn_command(&session, &kind, &program).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hostfit", "deps", "wine", "--required", "--headless"])
            .unwrap();
        assert!(cli.headless);
        match cli.command {
            Commands::Deps { names, required } => {
                assert_eq!(names, vec!["wine".to_string()]);
                assert!(required);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_deps_requires_a_name() {
        assert!(Cli::try_parse_from(["hostfit", "deps"]).is_err());
    }
}
