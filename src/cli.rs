use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CollectCommand, CompletionsCommand, ConfigureCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "credsweep", version, about = "Collect and merge IAM credential reports across AWS accounts", long_about = None)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        default_value = "default",
        help = "Configuration profile name"
    )]
    pub profile: String,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Assume the audit role in each account and merge their credential reports")]
    Collect(CollectCommand),
    #[command(about = "Configure paths, role name and output format for a profile")]
    Configure(ConfigureCommand),
    #[command(about = "Generate shell completion scripts for credsweep")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let profile = self.profile;
        let command = self
            .command
            .unwrap_or_else(|| Commands::Collect(CollectCommand::default()));

        match command {
            Commands::Collect(cmd) => cmd.execute(&profile).await,
            Commands::Configure(cmd) => cmd.execute(&profile).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutputFormat;
    use clap::{CommandFactory, error::ErrorKind};
    use std::path::PathBuf;

    fn collect_args(args: &[&str]) -> CollectCommand {
        match Cli::try_parse_from(args).unwrap().command {
            Some(Commands::Collect(cmd)) => cmd,
            other => panic!("Expected Collect command, got {other:?}"),
        }
    }

    #[test]
    fn test_no_command_defaults_to_collect() {
        let cli = Cli::try_parse_from(["credsweep"]).unwrap();
        assert!(cli.command.is_none());

        match cli
            .command
            .unwrap_or_else(|| Commands::Collect(CollectCommand::default()))
        {
            Commands::Collect(cmd) => {
                assert_eq!(cmd.role, None);
                assert!(!cmd.password_status);
            }
            _ => panic!("Expected Collect command as default"),
        }
    }

    #[test]
    fn test_profile_default_value() {
        let cli = Cli::try_parse_from(["credsweep", "collect"]).unwrap();
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_profile_after_subcommand() {
        let cli = Cli::try_parse_from(["credsweep", "collect", "-p", "audit"]).unwrap();
        assert_eq!(cli.profile, "audit");
    }

    #[test]
    fn test_collect_flags() {
        let cmd = collect_args(&[
            "credsweep",
            "collect",
            "-a",
            "accounts.csv",
            "-c",
            "creds.txt",
            "-o",
            "IAM/merged.xlsx",
            "-r",
            "OrgAudit",
            "--format",
            "xlsx",
            "--password-status",
            "--region",
            "eu-central-1",
        ]);

        assert_eq!(cmd.accounts, Some(PathBuf::from("accounts.csv")));
        assert_eq!(cmd.credentials, Some(PathBuf::from("creds.txt")));
        assert_eq!(cmd.output, Some(PathBuf::from("IAM/merged.xlsx")));
        assert_eq!(cmd.role.as_deref(), Some("OrgAudit"));
        assert_eq!(cmd.format, Some(OutputFormat::Xlsx));
        assert!(cmd.password_status);
        assert_eq!(cmd.region.as_deref(), Some("eu-central-1"));
    }

    #[test]
    fn test_polling_flags() {
        let cmd = collect_args(&[
            "credsweep",
            "collect",
            "--max-attempts",
            "4",
            "--poll-interval-secs",
            "0",
        ]);
        assert_eq!(cmd.max_attempts, Some(4));
        assert_eq!(cmd.poll_interval_secs, Some(0));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = Cli::try_parse_from(["credsweep", "collect", "--max-attempts", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Cli::try_parse_from(["credsweep", "collect", "--format", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_configure_command_parsing() {
        let cli = Cli::try_parse_from(["credsweep", "configure"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Configure(ConfigureCommand { show: false }))
        ));

        let cli = Cli::try_parse_from(["credsweep", "configure", "--show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Configure(ConfigureCommand { show: true }))
        ));
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["credsweep", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_command_structure_validation() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        assert!(Cli::try_parse_from(["credsweep", "invalid"]).is_err());
    }

    #[test]
    fn test_version_flag_works() {
        let err = Cli::try_parse_from(["credsweep", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["credsweep", "-vv", "collect"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["credsweep", "collect"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
