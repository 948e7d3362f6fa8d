use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::{io::Read, path::Path};

use crate::constants::ACCOUNT_ID_COLUMN;

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(default)]
    account_id: Option<String>,
}

/// Load account ids, in file order, from a CSV file with an `account_id` column
pub fn load_accounts(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open account list: {}", path.display()))?;

    parse_accounts(file).with_context(|| format!("Invalid account list: {}", path.display()))
}

fn parse_accounts(reader: impl Read) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let has_column = reader
        .headers()
        .context("Failed to read account list header")?
        .iter()
        .any(|name| name == ACCOUNT_ID_COLUMN);
    if !has_column {
        bail!("Account list has no '{ACCOUNT_ID_COLUMN}' column");
    }

    let mut accounts = Vec::new();
    for record in reader.deserialize::<AccountRecord>() {
        let record = record.context("Failed to read account list row")?;
        if let Some(account_id) = record.account_id.filter(|id| !id.is_empty()) {
            accounts.push(account_id);
        }
    }

    Ok(accounts)
}
