use anyhow::{Context, Result};
use clap::Args;
use std::{path::PathBuf, time::Duration};
use tracing::info;

use crate::{
    collector,
    config::{self, Config},
    report::{OutputFormat, RetryPolicy},
};

#[derive(Debug, Clone, Default, Args)]
pub struct CollectCommand {
    #[arg(short = 'a', long, help = "CSV file listing target accounts (account_id column)")]
    pub accounts: Option<PathBuf>,

    #[arg(short = 'c', long, help = "File with aws_access_key_id/aws_secret_access_key")]
    pub credentials: Option<PathBuf>,

    #[arg(short = 'o', long, help = "Path of the merged report")]
    pub output: Option<PathBuf>,

    #[arg(short = 'r', long, help = "Role name to assume in every account")]
    pub role: Option<String>,

    #[arg(short = 'f', long, value_enum, help = "Output format (default: from output extension)")]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Add a password_unused_status column")]
    pub password_status: bool,

    #[arg(long, help = "AWS region for STS and IAM calls")]
    pub region: Option<String>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Credential report fetch attempts per account"
    )]
    pub max_attempts: Option<u32>,

    #[arg(long, help = "Seconds to wait between credential report fetch attempts")]
    pub poll_interval_secs: Option<u64>,
}

impl CollectCommand {
    pub async fn execute(self, profile: &str) -> Result<()> {
        let config = config::load(profile)
            .await
            .with_context(|| format!("Failed to load configuration for profile '{profile}'"))?;

        let policy = self.retry_policy();
        let config = self.apply(config);
        info!(
            "Collecting credential reports with role {} into {}",
            config.role_name,
            config.report_output_path.display()
        );

        let summary = collector::run(&config, &policy).await?;
        info!(
            "Processed {} account(s), {} row(s), written: {}",
            summary.accounts, summary.rows, summary.written
        );

        Ok(())
    }

    fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            interval: self
                .poll_interval_secs
                .map_or(defaults.interval, Duration::from_secs),
        }
    }

    /// Command-line values take precedence over the profile configuration
    fn apply(self, config: Config) -> Config {
        Config {
            report_output_path: self.output.unwrap_or(config.report_output_path),
            account_list_path: self.accounts.unwrap_or(config.account_list_path),
            role_name: self.role.unwrap_or(config.role_name),
            credentials_path: self.credentials.unwrap_or(config.credentials_path),
            output_format: self.format.or(config.output_format),
            password_status: self.password_status || config.password_status,
            region: self.region.unwrap_or(config.region),
        }
    }
}
