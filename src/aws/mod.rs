use std::future::Future;

use anyhow::Result;
use aws_smithy_types::DateTime;

pub mod credentials;
pub mod iam;
pub mod sts;

/// Long-lived base credentials used to call STS
#[derive(Clone)]
pub struct AccountCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Temporary credentials scoped to the cross-account role of one account
#[derive(Clone)]
pub struct DelegatedSession {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

impl std::fmt::Debug for DelegatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatedSession")
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// Opens an IAM handle for a target account
pub trait AccountSessions {
    type Iam: iam::IamApi;

    fn open(&self, account_id: &str) -> impl Future<Output = Result<Self::Iam>>;
}

// Re-export commonly used types (functions should be accessed via module path)
pub use iam::{AccessKeyInfo, IamApi, IamClientApi, ReportPoll};
pub use sts::RoleAssumer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let base = AccountCredentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "very-secret".to_string(),
        };
        let rendered = format!("{base:?}");
        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("very-secret"));

        let session = DelegatedSession {
            account_id: "111122223333".to_string(),
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "temp-secret".to_string(),
            session_token: "temp-token".to_string(),
            expiration: DateTime::from_secs(0),
        };
        let rendered = format!("{session:?}");
        assert!(rendered.contains("111122223333"));
        assert!(!rendered.contains("temp-secret"));
        assert!(!rendered.contains("temp-token"));
    }
}
