use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    io::{self, Write},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::{
    accounts,
    aws::{AccountSessions, IamApi, RoleAssumer, credentials},
    config::Config,
    report::{
        AccessKeyLookup, CredentialReport, EnrichedRow, MergedReport, OutputFormat, ReportFetch,
        ReportLayout, RetryPolicy, fetch_credential_report, write_report,
    },
};

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts: usize,
    pub rows: usize,
    pub written: bool,
}

/// Collect every account listed in the configuration and write the merged report
pub async fn run(config: &Config, policy: &RetryPolicy) -> Result<RunSummary> {
    let base = credentials::load_credentials(&config.credentials_path)?;
    let account_ids = accounts::load_accounts(&config.account_list_path)?;
    info!("Loaded {} account(s)", account_ids.len());

    let sessions = RoleAssumer::new(&base, &config.role_name, &config.region).await;
    let layout = ReportLayout {
        password_status: config.password_status,
    };

    let mut out = io::stdout();
    let merged =
        collect_accounts(&account_ids, &sessions, policy, layout, Utc::now(), &mut out).await?;
    let written = save_report(
        &merged,
        &config.report_output_path,
        config.resolved_format(),
        &mut out,
    )
    .await?;

    Ok(RunSummary {
        accounts: account_ids.len(),
        rows: merged.len(),
        written,
    })
}

/// Process accounts one after another, skipping any that fail.
///
/// Per-account status lines go to `out`; only a failing `out` ends the run.
pub async fn collect_accounts<S: AccountSessions>(
    account_ids: &[String],
    sessions: &S,
    policy: &RetryPolicy,
    layout: ReportLayout,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<MergedReport> {
    let mut merged = MergedReport::new(layout);

    for account_id in account_ids {
        let iam = match sessions.open(account_id).await {
            Ok(iam) => iam,
            Err(e) => {
                warn!("Role assumption failed for {}: {e:#}", account_id);
                writeln!(out, "[ERROR] Failed to assume role for account: {account_id}")?;
                continue;
            }
        };

        let text = match fetch_credential_report(&iam, policy).await {
            ReportFetch::Ready(text) => text,
            ReportFetch::Exhausted { attempts } => {
                debug!("Report for {} not ready after {} attempts", account_id, attempts);
                report_unavailable(out, account_id)?;
                continue;
            }
            ReportFetch::Failed(_) => {
                report_unavailable(out, account_id)?;
                continue;
            }
        };

        let report = match CredentialReport::parse(&text) {
            Ok(report) => report,
            Err(e) => {
                warn!("Unreadable credential report for {}: {e:#}", account_id);
                report_unavailable(out, account_id)?;
                continue;
            }
        };

        let rows = enrich_report(&iam, &report, account_id, now).await;
        info!("Collected {} row(s) from account {}", rows.len(), account_id);
        merged.extend_account(report.header(), rows);
    }

    Ok(merged)
}

fn report_unavailable(out: &mut impl Write, account_id: &str) -> io::Result<()> {
    writeln!(out, "[WARNING] Could not fetch credential report for account: {account_id}")
}

async fn enrich_report<I: IamApi>(
    iam: &I,
    report: &CredentialReport,
    account_id: &str,
    now: DateTime<Utc>,
) -> Vec<EnrichedRow> {
    let mut rows = Vec::with_capacity(report.len());

    for row in report.rows() {
        if row.is_root() {
            rows.push(EnrichedRow::root(&row, account_id));
            continue;
        }

        let keys = match row.user() {
            Some(user) => key_lookup(iam, user).await,
            None => AccessKeyLookup::default(),
        };
        rows.push(EnrichedRow::from_row(&row, account_id, &keys, now));
    }

    rows
}

async fn key_lookup<I: IamApi>(iam: &I, user: &str) -> AccessKeyLookup {
    match iam.list_access_keys(user).await {
        Ok(keys) => AccessKeyLookup::from_keys(keys),
        Err(e) => {
            warn!("Access key lookup failed for {}: {e:#}", user);
            AccessKeyLookup::default()
        }
    }
}

/// Write the merged report unless it is empty; returns whether a file was written
pub async fn save_report(
    merged: &MergedReport,
    path: &Path,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<bool> {
    if merged.is_empty() {
        writeln!(out, "[INFO] No data to write.")?;
        return Ok(false);
    }

    write_report(merged, path, format)
        .await
        .context("Failed to save merged credential report")?;

    writeln!(out, "[SUCCESS] Report saved to: {}", path.display())?;
    Ok(true)
}
