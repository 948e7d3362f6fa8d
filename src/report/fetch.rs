use std::time::Duration;

use tokio::time;
use tracing::{debug, warn};

use crate::aws::{IamApi, ReportPoll};
use crate::constants::{REPORT_MAX_ATTEMPTS, REPORT_POLL_INTERVAL};

/// Fixed-interval polling budget for credential report retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: REPORT_MAX_ATTEMPTS,
            interval: REPORT_POLL_INTERVAL,
        }
    }
}

/// Result of fetching an account's credential report
#[derive(Debug)]
pub enum ReportFetch {
    Ready(String),
    /// Still not ready after every attempt
    Exhausted { attempts: u32 },
    /// The fetch call failed for a reason other than "not ready"
    Failed(anyhow::Error),
}

/// Request report generation, then poll until it is ready or the budget runs out.
///
/// Generation errors are ignored: a report may already be in progress.
pub async fn fetch_credential_report<I: IamApi>(iam: &I, policy: &RetryPolicy) -> ReportFetch {
    if let Err(e) = iam.generate_credential_report().await {
        debug!("Ignoring credential report generation error: {e:#}");
    }

    for attempt in 1..=policy.max_attempts {
        match iam.get_credential_report().await {
            Ok(ReportPoll::Ready(text)) => {
                debug!("Credential report ready after {} attempt(s)", attempt);
                return ReportFetch::Ready(text);
            }
            Ok(ReportPoll::NotReady) => {
                debug!(
                    "Credential report not ready (attempt {}/{})",
                    attempt, policy.max_attempts
                );
                if attempt < policy.max_attempts {
                    time::sleep(policy.interval).await;
                }
            }
            Err(e) => {
                warn!("Credential report fetch failed: {e:#}");
                return ReportFetch::Failed(e);
            }
        }
    }

    ReportFetch::Exhausted {
        attempts: policy.max_attempts,
    }
}
