use std::{env, path::PathBuf, time::Duration};

/// Configuration directory name under `~/.config`
pub const CONFIG_DIR_NAME: &str = "credsweep";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config";

/// Environment variable overriding the configuration file location
pub const CONFIG_FILE_ENV: &str = "CREDSWEEP_CONFIG_FILE";

/// Default path of the merged report
pub const DEFAULT_REPORT_OUTPUT_PATH: &str = "IAM/credential_reports_merged.csv";

/// Default path of the account list
pub const DEFAULT_ACCOUNT_LIST_PATH: &str = "account_list.csv";

/// Default path of the base credentials file
pub const DEFAULT_CREDENTIALS_PATH: &str = "aws_credentials.txt";

/// Cross-account role assumed in every target account
pub const DEFAULT_ROLE_NAME: &str = "SecurityAutomation";

/// Session name passed to STS AssumeRole
pub const ROLE_SESSION_NAME: &str = "KeyRotationSession";

/// Default AWS region for STS and IAM clients when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Column holding the account identifier in the account list
pub const ACCOUNT_ID_COLUMN: &str = "account_id";

/// Attempts made to fetch a generated credential report
pub const REPORT_MAX_ATTEMPTS: u32 = 10;

/// Pause between credential report fetch attempts
pub const REPORT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Passwords unused for strictly more days than this are flagged
pub const PASSWORD_UNUSED_THRESHOLD_DAYS: i64 = 90;

/// Flag value written for passwords unused beyond the threshold
pub const PASSWORD_UNUSED_FLAG: &str = ">90 days";

/// User name prefix of the account root row in a credential report
pub const ROOT_ACCOUNT_USER: &str = "<root_account>";

/// Worksheet name used for spreadsheet output
pub const WORKSHEET_NAME: &str = "credential_report";

/// Get the configuration file path
/// Respects CREDSWEEP_CONFIG_FILE environment variable if set
pub fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_config_path_with_env() {
        let original = env::var(CONFIG_FILE_ENV).ok();

        unsafe {
            env::set_var(CONFIG_FILE_ENV, "/custom/credsweep/config");
        }
        let path = get_config_path();
        assert_eq!(path, Some(PathBuf::from("/custom/credsweep/config")));

        unsafe {
            match original {
                Some(val) => env::set_var(CONFIG_FILE_ENV, val),
                None => env::remove_var(CONFIG_FILE_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_config_path_default() {
        let original = env::var(CONFIG_FILE_ENV).ok();

        unsafe {
            env::remove_var(CONFIG_FILE_ENV);
        }
        let path = get_config_path();

        if let Some(p) = path {
            let path_str = p.to_string_lossy();
            assert!(path_str.contains(CONFIG_DIR_NAME));
            assert!(path_str.ends_with(CONFIG_FILE_NAME));
        }

        unsafe {
            if let Some(val) = original {
                env::set_var(CONFIG_FILE_ENV, val);
            }
        }
    }
}
