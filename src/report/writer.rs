use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::merge::MergedReport;
use crate::constants::WORKSHEET_NAME;

/// Serialization of the merged report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// `.xlsx` paths get a workbook, everything else CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }
}

/// Write the merged report, creating parent directories as needed
pub async fn write_report(report: &MergedReport, path: &Path, format: OutputFormat) -> Result<()> {
    let Some(header) = report.header() else {
        bail!("Merged report has no header");
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    debug!(
        "Writing {} rows as {} to {}",
        report.len(),
        format.as_str(),
        path.display()
    );

    let bytes = match format {
        OutputFormat::Csv => render_csv(header, report.rows()),
        OutputFormat::Xlsx => render_xlsx(header, report.rows()),
    }
    .with_context(|| format!("Failed to render {} report", format.as_str()))?;

    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!("Report written to {}", path.display());
    Ok(())
}

fn render_csv(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

fn render_xlsx(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    for (col, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, name, &bold)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(index + 1).context("Too many rows for a worksheet")?;
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_num, column_index(col)?, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).context("Too many columns for a worksheet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::enrich::{Age, EnrichedRow, PasswordUsage, ReportLayout};
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use tempfile::tempdir;

    const EXPECTED_HEADER: [&str; 7] = [
        "user",
        "arn",
        "access_key_1_id",
        "access_key_2_id",
        "access_key_1_age",
        "access_key_2_age",
        "account_id",
    ];
    const EXPECTED_ROW: [&str; 7] = [
        "alice",
        "arn:aws:iam::111:user/alice",
        "AKIAALICE",
        "",
        "12",
        "",
        "111",
    ];

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => panic!("Unexpected cell {other:?}"),
        }
    }

    fn sample_report() -> MergedReport {
        let mut report = MergedReport::new(ReportLayout::default());
        report.extend_account(
            &["user".to_string(), "arn".to_string()],
            vec![EnrichedRow {
                source: vec!["alice".to_string(), "arn:aws:iam::111:user/alice".to_string()],
                access_key_ids: [Some("AKIAALICE".to_string()), None],
                access_key_ages: [Age::Days(12), Age::Unknown],
                account_id: "111".to_string(),
                password_usage: PasswordUsage::Unknown,
            }],
        );
        report
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.xlsx")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("a/b.XLSX")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("a/b.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("report")), OutputFormat::Csv);
    }

    #[tokio::test]
    async fn test_write_csv_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IAM").join("nested").join("merged.csv");

        write_report(&sample_report(), &path, OutputFormat::Csv)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![EXPECTED_HEADER.join(","), EXPECTED_ROW.join(",")]
        );
    }

    #[tokio::test]
    async fn test_write_xlsx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.xlsx");

        write_report(&sample_report(), &path, OutputFormat::Xlsx)
            .await
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![WORKSHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(WORKSHEET_NAME).unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        assert_eq!(rows, vec![EXPECTED_HEADER.to_vec(), EXPECTED_ROW.to_vec()]);
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        std::fs::write(&path, "stale contents from an earlier run\n".repeat(20)).unwrap();

        write_report(&sample_report(), &path, OutputFormat::Csv)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(!contents.contains("stale"));
    }

    #[tokio::test]
    async fn test_write_without_header_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.csv");

        let result = write_report(&MergedReport::default(), &path, OutputFormat::Csv).await;
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
