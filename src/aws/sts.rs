use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials as SdkCredentials;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_sts::Client as StsClient;
use std::time::SystemTime;
use tracing::{debug, info};

use super::{AccountCredentials, AccountSessions, DelegatedSession, IamClientApi};
use crate::constants::ROLE_SESSION_NAME;

const PROVIDER_NAME: &str = "credsweep";

/// Build the ARN of a role inside a target account
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// Assumes the cross-account role in each target account
#[derive(Debug, Clone)]
pub struct RoleAssumer {
    client: StsClient,
    role_name: String,
    region: String,
}

impl RoleAssumer {
    pub async fn new(base: &AccountCredentials, role_name: &str, region: &str) -> Self {
        let credentials = SdkCredentials::new(
            &base.access_key_id,
            &base.secret_access_key,
            None,
            None,
            PROVIDER_NAME,
        );
        let config = load_sdk_config(credentials, region).await;

        Self {
            client: StsClient::new(&config),
            role_name: role_name.to_string(),
            region: region.to_string(),
        }
    }

    /// Assume the role in `account_id` and return its temporary credentials
    pub async fn assume_role(&self, account_id: &str) -> Result<DelegatedSession> {
        let role_arn = role_arn(account_id, &self.role_name);
        info!("Calling AWS STS AssumeRole for account {}", account_id);
        debug!("Role ARN: {}", role_arn);

        let response = self
            .client
            .assume_role()
            .role_arn(&role_arn)
            .role_session_name(ROLE_SESSION_NAME)
            .send()
            .await
            .with_context(|| format!("Failed to assume role {role_arn}"))?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        Ok(DelegatedSession {
            account_id: account_id.to_string(),
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: *sts_creds.expiration(),
        })
    }
}

impl AccountSessions for RoleAssumer {
    type Iam = IamClientApi;

    async fn open(&self, account_id: &str) -> Result<IamClientApi> {
        let session = self.assume_role(account_id).await?;
        let config = session_sdk_config(&session, &self.region).await;
        Ok(IamClientApi::new(IamClient::new(&config)))
    }
}

async fn session_sdk_config(session: &DelegatedSession, region: &str) -> SdkConfig {
    let expires_after = SystemTime::try_from(session.expiration).ok();
    let credentials = SdkCredentials::new(
        &session.access_key_id,
        &session.secret_access_key,
        Some(session.session_token.clone()),
        expires_after,
        PROVIDER_NAME,
    );
    load_sdk_config(credentials, region).await
}

async fn load_sdk_config(credentials: SdkCredentials, region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(credentials)
        .load()
        .await
}
