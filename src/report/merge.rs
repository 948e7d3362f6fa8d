use super::enrich::{EnrichedRow, ReportLayout};

/// Rows of every collected account under a single header.
///
/// The header is fixed by the first account that contributes; later
/// accounts are assumed to share its field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedReport {
    layout: ReportLayout,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl MergedReport {
    pub fn new(layout: ReportLayout) -> Self {
        Self {
            layout,
            header: None,
            rows: Vec::new(),
        }
    }

    /// Append one account's rows, taking its header if none is set yet
    pub fn extend_account(&mut self, report_header: &[String], rows: Vec<EnrichedRow>) {
        if self.header.is_none() {
            self.header = Some(self.layout.extend_header(report_header));
        }

        let layout = self.layout;
        self.rows
            .extend(rows.into_iter().map(|row| row.into_cells(layout)));
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no account contributed a data row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
