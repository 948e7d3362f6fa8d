use anyhow::{Context, Result};
use std::{fs, path::Path};

use super::AccountCredentials;

const ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
const SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";
const DEFAULT_SECTION: &str = "default";

/// Load base credentials from a `key=value` file.
///
/// Lines without `=` are ignored and a repeated key keeps its last value.
/// Keys outside any section win; a `[default]` section as found in AWS
/// shared credentials files is used as a fallback.
pub fn load_credentials(path: &Path) -> Result<AccountCredentials> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;

    credentials_from_kv(&raw)
        .with_context(|| format!("Invalid credentials file: {}", path.display()))
}

#[derive(Debug, Default)]
struct KeyPair {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
}

impl KeyPair {
    fn set(&mut self, key: &str, value: String) {
        match key {
            ACCESS_KEY_ID_KEY => self.access_key_id = Some(value),
            SECRET_ACCESS_KEY_KEY => self.secret_access_key = Some(value),
            _ => {}
        }
    }
}

fn credentials_from_kv(raw: &str) -> Result<AccountCredentials> {
    let mut general = KeyPair::default();
    let mut default = KeyPair::default();
    // None outside any section, Some(is_default) inside one
    let mut section: Option<bool> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            section = Some(name.trim() == DEFAULT_SECTION);
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let target = match section {
            None => &mut general,
            Some(true) => &mut default,
            Some(false) => continue,
        };
        target.set(key.trim(), value.to_string());
    }

    let access_key_id = general
        .access_key_id
        .or(default.access_key_id)
        .context("aws_access_key_id not found")?;
    let secret_access_key = general
        .secret_access_key
        .or(default.secret_access_key)
        .context("aws_secret_access_key not found")?;

    Ok(AccountCredentials {
        access_key_id,
        secret_access_key,
    })
}
