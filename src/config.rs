use crate::constants::{
    self, DEFAULT_ACCOUNT_LIST_PATH, DEFAULT_AWS_REGION, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_REPORT_OUTPUT_PATH, DEFAULT_ROLE_NAME,
};
use crate::report::writer::OutputFormat;
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use ini::{Ini, Properties};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Run configuration passed into the collection entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub report_output_path: PathBuf,
    pub account_list_path: PathBuf,
    pub role_name: String,
    pub credentials_path: PathBuf,
    /// Explicit output format; inferred from the output path when unset
    pub output_format: Option<OutputFormat>,
    /// Add the `password_unused_status` column
    pub password_status: bool,
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_output_path: PathBuf::from(DEFAULT_REPORT_OUTPUT_PATH),
            account_list_path: PathBuf::from(DEFAULT_ACCOUNT_LIST_PATH),
            role_name: DEFAULT_ROLE_NAME.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            output_format: None,
            password_status: false,
            region: DEFAULT_AWS_REGION.to_string(),
        }
    }
}

impl Config {
    fn from_ini_section(section: &Properties) -> Self {
        let defaults = Self::default();

        Self {
            report_output_path: section
                .get("report_output_path")
                .map_or(defaults.report_output_path, PathBuf::from),
            account_list_path: section
                .get("account_list_path")
                .map_or(defaults.account_list_path, PathBuf::from),
            role_name: section
                .get("role_name")
                .map_or(defaults.role_name, String::from),
            credentials_path: section
                .get("credentials_path")
                .map_or(defaults.credentials_path, PathBuf::from),
            output_format: section
                .get("output_format")
                .and_then(|s| OutputFormat::from_str(s, true).ok()),
            password_status: section
                .get("password_status")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.password_status),
            region: section
                .get("region")
                .map_or(defaults.region, String::from),
        }
    }

    fn save_to_ini(&self, ini: &mut Ini, profile: &str) {
        let mut section = ini.with_section(Some(section_name(profile)));
        section
            .set(
                "report_output_path",
                self.report_output_path.to_string_lossy(),
            )
            .set(
                "account_list_path",
                self.account_list_path.to_string_lossy(),
            )
            .set("role_name", &self.role_name)
            .set("credentials_path", self.credentials_path.to_string_lossy())
            .set("password_status", self.password_status.to_string())
            .set("region", &self.region);

        if let Some(format) = self.output_format {
            section.set("output_format", format.as_str());
        }
    }

    /// Output format to write, falling back to the output path extension
    pub fn resolved_format(&self) -> OutputFormat {
        self.output_format
            .unwrap_or_else(|| OutputFormat::from_path(&self.report_output_path))
    }
}

fn section_name(profile: &str) -> String {
    if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {profile}")
    }
}

/// Load the configuration for a profile.
///
/// A missing config file, or a missing `default` section, yields the
/// built-in defaults. A missing named profile is an error.
pub async fn load(profile: &str) -> Result<Config> {
    let path = get_config_path()?;
    load_from(&path, profile)
}

fn load_from(path: &Path, profile: &str) -> Result<Config> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let ini = Ini::load_from_file(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))?;

    match ini.section(Some(section_name(profile))) {
        Some(section) => Ok(Config::from_ini_section(section)),
        None if profile == "default" => Ok(Config::default()),
        None => bail!("Profile '{profile}' not found in config"),
    }
}

pub async fn save(profile: &str, config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut ini = path
        .exists()
        .then(|| Ini::load_from_file(&path).ok())
        .flatten()
        .unwrap_or_else(Ini::new);

    config.save_to_ini(&mut ini, profile);

    ini.write_to_file(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

pub async fn configure_interactive(profile: &str) -> Result<()> {
    println!("Configuring credsweep for profile: {profile}");

    let existing_config = load(profile).await.ok();

    if existing_config.is_some() {
        println!("Press Enter to keep current values, or type new values.");
    }
    println!();

    let theme = ColorfulTheme::default();
    let current = existing_config.unwrap_or_default();

    let account_list_path = Input::<String>::with_theme(&theme)
        .with_prompt("Account list file")
        .default(current.account_list_path.to_string_lossy().to_string())
        .interact_text()
        .context("Failed to read account list path")?;

    let credentials_path = Input::<String>::with_theme(&theme)
        .with_prompt("Base credentials file")
        .default(current.credentials_path.to_string_lossy().to_string())
        .interact_text()
        .context("Failed to read credentials path")?;

    let role_name = Input::<String>::with_theme(&theme)
        .with_prompt("Cross-account role name")
        .default(current.role_name)
        .validate_with(|input: &String| {
            if is_valid_role_name(input) {
                Ok(())
            } else {
                Err("Role name must be 1-64 characters of [A-Za-z0-9+=,.@_-]")
            }
        })
        .interact_text()
        .context("Failed to read role name")?;

    let report_output_path = Input::<String>::with_theme(&theme)
        .with_prompt("Merged report output path")
        .default(current.report_output_path.to_string_lossy().to_string())
        .interact_text()
        .context("Failed to read report output path")?;

    let formats = OutputFormat::value_variants();
    let default_format = OutputFormat::from_path(Path::new(&report_output_path));
    let selected = Select::with_theme(&theme)
        .with_prompt("Output format")
        .items(&formats.iter().map(|f| f.as_str()).collect::<Vec<_>>())
        .default(
            formats
                .iter()
                .position(|f| *f == current.output_format.unwrap_or(default_format))
                .unwrap_or(0),
        )
        .interact()
        .context("Failed to read output format")?;

    let password_status = Confirm::with_theme(&theme)
        .with_prompt("Include password_unused_status column?")
        .default(current.password_status)
        .interact()
        .context("Failed to read password status choice")?;

    let region = Input::<String>::with_theme(&theme)
        .with_prompt("AWS region for STS and IAM")
        .default(current.region)
        .interact_text()
        .context("Failed to read region")?;

    let config = Config {
        report_output_path: PathBuf::from(report_output_path),
        account_list_path: PathBuf::from(account_list_path),
        role_name,
        credentials_path: PathBuf::from(credentials_path),
        output_format: Some(formats[selected]),
        password_status,
        region,
    };

    save(profile, &config).await?;

    println!("\nConfiguration saved successfully.");
    Ok(())
}

fn get_config_path() -> Result<PathBuf> {
    constants::get_config_path().context("Failed to determine credsweep config path")
}

fn is_valid_role_name(s: &str) -> bool {
    (1..=64).contains(&s.len())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c))
}
