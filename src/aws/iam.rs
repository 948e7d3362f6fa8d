use anyhow::{Context, Result};
use aws_sdk_iam::Client as IamClient;
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::debug;

/// Outcome of a single credential report fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPoll {
    /// Report content decoded as UTF-8 CSV text
    Ready(String),
    /// Generation has not finished yet
    NotReady,
}

/// Access key metadata needed to attribute key ids to report slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyInfo {
    pub access_key_id: String,
    pub created: DateTime<Utc>,
}

/// IAM operations used while collecting one account
pub trait IamApi {
    fn generate_credential_report(&self) -> impl Future<Output = Result<()>>;

    fn get_credential_report(&self) -> impl Future<Output = Result<ReportPoll>>;

    fn list_access_keys(&self, user_name: &str)
    -> impl Future<Output = Result<Vec<AccessKeyInfo>>>;
}

/// [`IamApi`] backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct IamClientApi {
    client: IamClient,
}

impl IamClientApi {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

impl IamApi for IamClientApi {
    async fn generate_credential_report(&self) -> Result<()> {
        let response = self
            .client
            .generate_credential_report()
            .send()
            .await
            .context("Failed to request credential report generation")?;

        debug!("Credential report state: {:?}", response.state());
        Ok(())
    }

    async fn get_credential_report(&self) -> Result<ReportPoll> {
        match self.client.get_credential_report().send().await {
            Ok(response) => {
                let content = response
                    .content()
                    .context("Credential report has no content")?;
                let text = String::from_utf8(content.as_ref().to_vec())
                    .context("Credential report is not valid UTF-8")?;
                Ok(ReportPoll::Ready(text))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_credential_report_not_ready_exception()
                    || service_err.is_credential_report_not_present_exception()
                {
                    Ok(ReportPoll::NotReady)
                } else {
                    Err(anyhow::Error::new(service_err).context("Failed to get credential report"))
                }
            }
        }
    }

    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<AccessKeyInfo>> {
        let response = self
            .client
            .list_access_keys()
            .user_name(user_name)
            .send()
            .await
            .with_context(|| format!("Failed to list access keys for user {user_name}"))?;

        let keys = response
            .access_key_metadata()
            .iter()
            .filter_map(|meta| {
                let access_key_id = meta.access_key_id()?.to_string();
                let created = DateTime::from_timestamp(meta.create_date()?.secs(), 0)?;
                Some(AccessKeyInfo {
                    access_key_id,
                    created,
                })
            })
            .collect();

        Ok(keys)
    }
}
