//! Derived columns added to every credential report row.
//!
//! Timestamps in a credential report are best effort: `N/A`,
//! `no_information`, empty cells and anything unparsable are treated as
//! unknown and rendered as empty cells, never as errors.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

use super::parse::CredentialReportRow;
use crate::aws::AccessKeyInfo;
use crate::constants::{PASSWORD_UNUSED_FLAG, PASSWORD_UNUSED_THRESHOLD_DAYS};

const SECONDS_PER_DAY: i64 = 86_400;

const KEY_SLOTS: [&str; 2] = ["access_key_1_last_rotated", "access_key_2_last_rotated"];

/// Columns appended to every report row, in output order
const DERIVED_COLUMNS: [&str; 5] = [
    "access_key_1_id",
    "access_key_2_id",
    "access_key_1_age",
    "access_key_2_age",
    "account_id",
];

const PASSWORD_STATUS_COLUMN: &str = "password_unused_status";

/// Parse a credential report timestamp into UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("N/A") {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Whole days elapsed between `then` and `now`, rounded down
pub fn elapsed_days(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Age of an access key in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Days(i64),
    Unknown,
}

impl Age {
    pub fn from_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> Self {
        raw.and_then(parse_timestamp)
            .map_or(Self::Unknown, |then| Self::Days(elapsed_days(then, now)))
    }

    pub fn to_cell(self) -> String {
        match self {
            Self::Days(days) => days.to_string(),
            Self::Unknown => String::new(),
        }
    }
}

/// Password usage relative to the unused threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordUsage {
    /// Last used strictly more than the threshold ago
    Stale,
    Recent,
    Unknown,
}

impl PasswordUsage {
    pub fn from_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> Self {
        match raw.and_then(parse_timestamp) {
            Some(then) if elapsed_days(then, now) > PASSWORD_UNUSED_THRESHOLD_DAYS => Self::Stale,
            Some(_) => Self::Recent,
            None => Self::Unknown,
        }
    }

    pub fn to_cell(self) -> String {
        match self {
            Self::Stale => PASSWORD_UNUSED_FLAG.to_string(),
            Self::Recent | Self::Unknown => String::new(),
        }
    }
}

/// Access key ids of one user keyed by creation time.
///
/// When two keys share a creation time the one listed last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessKeyLookup {
    by_created: HashMap<DateTime<Utc>, String>,
}

impl AccessKeyLookup {
    pub fn from_keys(keys: impl IntoIterator<Item = AccessKeyInfo>) -> Self {
        let by_created = keys
            .into_iter()
            .map(|key| (key.created, key.access_key_id))
            .collect();
        Self { by_created }
    }

    /// Key id whose creation time equals the given rotation timestamp
    pub fn find(&self, rotated: Option<&str>) -> Option<&str> {
        let rotated = rotated.and_then(parse_timestamp)?;
        self.by_created.get(&rotated).map(String::as_str)
    }
}

/// Which optional derived columns are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportLayout {
    pub password_status: bool,
}

impl ReportLayout {
    pub fn derived_columns(self) -> Vec<&'static str> {
        let mut columns = DERIVED_COLUMNS.to_vec();
        if self.password_status {
            columns.push(PASSWORD_STATUS_COLUMN);
        }
        columns
    }

    /// Report header followed by the derived columns
    pub fn extend_header(self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .cloned()
            .chain(self.derived_columns().into_iter().map(String::from))
            .collect()
    }
}

/// A report row with its derived values; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRow {
    pub source: Vec<String>,
    pub access_key_ids: [Option<String>; 2],
    pub access_key_ages: [Age; 2],
    pub account_id: String,
    pub password_usage: PasswordUsage,
}

impl EnrichedRow {
    /// Root rows carry no derived values besides the account id
    pub fn root(row: &CredentialReportRow<'_>, account_id: &str) -> Self {
        Self {
            source: row.values().to_vec(),
            access_key_ids: [None, None],
            access_key_ages: [Age::Unknown, Age::Unknown],
            account_id: account_id.to_string(),
            password_usage: PasswordUsage::Unknown,
        }
    }

    pub fn from_row(
        row: &CredentialReportRow<'_>,
        account_id: &str,
        keys: &AccessKeyLookup,
        now: DateTime<Utc>,
    ) -> Self {
        let rotated = KEY_SLOTS.map(|field| row.get(field));

        Self {
            source: row.values().to_vec(),
            access_key_ids: rotated.map(|ts| keys.find(ts).map(String::from)),
            access_key_ages: rotated.map(|ts| Age::from_timestamp(ts, now)),
            account_id: account_id.to_string(),
            password_usage: PasswordUsage::from_timestamp(row.get("password_last_used"), now),
        }
    }

    /// Source values followed by the derived cells for `layout`
    pub fn into_cells(self, layout: ReportLayout) -> Vec<String> {
        let [id_1, id_2] = self.access_key_ids;
        let [age_1, age_2] = self.access_key_ages;

        let mut cells = self.source;
        cells.extend([
            id_1.unwrap_or_default(),
            id_2.unwrap_or_default(),
            age_1.to_cell(),
            age_2.to_cell(),
            self.account_id,
        ]);
        if layout.password_status {
            cells.push(self.password_usage.to_cell());
        }
        cells
    }
}
