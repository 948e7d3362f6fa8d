pub mod enrich;
pub mod fetch;
pub mod merge;
pub mod parse;
pub mod writer;

pub use enrich::{AccessKeyLookup, Age, EnrichedRow, PasswordUsage, ReportLayout};
pub use fetch::{ReportFetch, RetryPolicy, fetch_credential_report};
pub use merge::MergedReport;
pub use parse::{CredentialReport, CredentialReportRow};
pub use writer::{OutputFormat, write_report};
