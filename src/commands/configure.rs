use anyhow::{Context, Result};
use clap::Args;
use std::fmt::Write;

use crate::config::{self, Config};

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigureCommand {
    #[arg(long, help = "Print the effective settings of the profile instead of prompting")]
    pub show: bool,
}

impl ConfigureCommand {
    pub async fn execute(self, profile: &str) -> Result<()> {
        if !self.show {
            return config::configure_interactive(profile).await;
        }

        let config = config::load(profile)
            .await
            .with_context(|| format!("Failed to load configuration for profile '{profile}'"))?;
        print!("{}", describe(profile, &config));
        Ok(())
    }
}

fn describe(profile: &str, config: &Config) -> String {
    let mut text = format!("[{profile}]\n");
    let entries = [
        ("accounts", config.account_list_path.display().to_string()),
        ("credentials", config.credentials_path.display().to_string()),
        ("output", config.report_output_path.display().to_string()),
        ("format", config.resolved_format().as_str().to_string()),
        ("role", config.role_name.clone()),
        ("region", config.region.clone()),
        ("password_status", config.password_status.to_string()),
    ];
    for (key, value) in entries {
        // writing into a String cannot fail
        let _ = writeln!(text, "{key:<16}{value}");
    }
    text
}
