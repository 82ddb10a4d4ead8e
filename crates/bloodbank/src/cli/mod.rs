//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure and the output helpers used by the
//! `bloodbank` binary.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ConfigCommand, OutputFormat, RegisterCommand, SearchCommand, StatusCommand, TableCommand,
};
pub use output::{write_table, Console, TerminalCounters};

/// bloodbank - Blood donor registry
///
/// Register blood donors, search them by blood group, location and age, and
/// follow the registry's donor and lives-saved counters.
#[derive(Debug, Parser)]
#[command(name = "bloodbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new donor
    Register(RegisterCommand),

    /// Search registered donors
    Search(SearchCommand),

    /// Clear the search and show the default listing
    Reset(TableCommand),

    /// Show the registered donors and lives saved counters
    Stats,

    /// Show the donor table and counters together
    Dashboard(TableCommand),

    /// Show backend and store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Stats,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "bloodbank");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "bloodbank",
            "register",
            "--full-name",
            "Asha Rao",
            "--blood-group",
            "O+",
            "--age",
            "29",
            "--phone",
            "9999999999",
            "--city",
            "Pune",
            "--state",
            "Maharashtra",
            "--medical-history",
        ])
        .unwrap();

        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.blood_group.as_deref(), Some("O+"));
                assert!(cmd.medical_history);
                assert_eq!(cmd.format, OutputFormat::Table);
                assert!(cmd.to_form().validate().is_ok());
            }
            other => panic!("expected register, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_with_missing_fields() {
        let cli = Cli::try_parse_from(["bloodbank", "register", "--full-name", "Asha"]).unwrap();
        assert!(matches!(cli.command, Command::Register(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_blood_group() {
        let result = Cli::try_parse_from(["bloodbank", "search", "--blood-group", "C+"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_max_age() {
        let result = Cli::try_parse_from(["bloodbank", "search", "--max-age", "old"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "bloodbank", "search", "-b", "B-", "-l", "pune", "-m", "40", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.blood_group.as_deref(), Some("B-"));
                assert_eq!(cmd.max_age, Some(40));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reset_and_dashboard() {
        let cli = Cli::try_parse_from(["bloodbank", "reset", "--format", "plain"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Reset(TableCommand {
                format: OutputFormat::Plain
            })
        ));

        let cli = Cli::try_parse_from(["bloodbank", "dashboard"]).unwrap();
        assert!(matches!(cli.command, Command::Dashboard(_)));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["bloodbank", "config", "validate", "-f", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_global_flags() {
        let cli =
            Cli::try_parse_from(["bloodbank", "-c", "/custom/config.toml", "-v", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: false })));
    }
}
