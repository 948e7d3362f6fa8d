use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;

use crate::constants::ROOT_ACCOUNT_USER;

/// A credential report as returned by IAM: header line plus one record per user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialReport {
    header: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CredentialReport {
    /// Parse the CSV text of a credential report.
    ///
    /// Records are kept verbatim; rows whose width differs from the header
    /// are accepted as-is.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim().as_bytes());

        let header: Vec<String> = reader
            .headers()
            .context("Failed to read credential report header")?
            .iter()
            .map(String::from)
            .collect();

        if header.iter().all(String::is_empty) {
            bail!("Credential report is empty");
        }

        let records = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()
            .context("Failed to read credential report records")?;

        Ok(Self { header, records })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = CredentialReportRow<'_>> {
        self.records.iter().map(|values| CredentialReportRow {
            header: &self.header,
            values,
        })
    }
}

/// One user's record, addressable by field name
#[derive(Debug, Clone, Copy)]
pub struct CredentialReportRow<'a> {
    header: &'a [String],
    values: &'a [String],
}

impl<'a> CredentialReportRow<'a> {
    pub fn get(&self, field: &str) -> Option<&'a str> {
        let index = self.header.iter().position(|name| name == field)?;
        self.values.get(index).map(String::as_str)
    }

    pub fn user(&self) -> Option<&'a str> {
        self.get("user")
    }

    /// The distinguished account root row has no individual access keys
    pub fn is_root(&self) -> bool {
        self.user()
            .is_some_and(|user| user.starts_with(ROOT_ACCOUNT_USER))
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}
