//! Tabular export: table view and CSV download of accumulated records.
//!
//! DESIGN
//! ======
//! Records expose their fields through [`Tabular::cell`] keyed by the same
//! strings the column projection uses, so one projection drives both the
//! on-screen table and the CSV header. Every data cell is quoted; list
//! values are flattened with `; ` inside the quotes. The header row is the
//! bare column keys.

use std::borrow::Cow;

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const CSV_LIST_SEPARATOR: &str = "; ";
const DISPLAY_LIST_SEPARATOR: &str = ", ";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush failed: {0}")]
    Flush(String),
    #[error("csv output was not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl crate::error::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Csv(_) => "E_CSV_WRITE",
            Self::Flush(_) => "E_CSV_FLUSH",
            Self::Utf8(_) => "E_CSV_UTF8",
        }
    }
}

/// One projected column: record field key plus display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

/// A single field value as seen by the table and CSV writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Text(&'a str),
    Owned(String),
    Int(i64),
    List(&'a [String]),
    Absent,
}

impl Cell<'_> {
    /// Unquoted CSV field content; the writer adds quotes and doubles embedded ones.
    fn csv_field(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Owned(text) => Cow::Borrowed(text.as_str()),
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::List(items) => Cow::Owned(items.join(CSV_LIST_SEPARATOR)),
            Self::Absent => Cow::Borrowed(""),
        }
    }

    /// Text shown in the table view.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::List(items) => items.join(DISPLAY_LIST_SEPARATOR),
            other => other.csv_field().into_owned(),
        }
    }
}

/// A record that can be projected onto columns.
pub trait Tabular {
    fn id(&self) -> Uuid;

    /// Value for a column key. Unknown keys are [`Cell::Absent`].
    fn cell(&self, key: &str) -> Cell<'_>;
}

/// A finished CSV download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

// =============================================================================
// CSV
// =============================================================================

/// Render records as CSV: a header of column keys, then one row per record.
///
/// The header is quoted only where a key needs it; every data cell is quoted.
///
/// # Errors
///
/// Returns [`ExportError`] if the CSV writer fails.
pub fn render_csv<T: Tabular>(records: &[T], columns: &[Column]) -> Result<String, ExportError> {
    let mut header = csv_writer(csv::QuoteStyle::Necessary, Vec::new());
    header.write_record(columns.iter().map(|c| c.key))?;
    let buf = finish(header)?;

    let mut rows = csv_writer(csv::QuoteStyle::Always, buf);
    for record in records {
        let cells: Vec<Cell<'_>> = columns.iter().map(|c| record.cell(c.key)).collect();
        rows.write_record(cells.iter().map(|cell| cell.csv_field().into_owned()))?;
    }
    Ok(String::from_utf8(finish(rows)?)?)
}

fn csv_writer(quote_style: csv::QuoteStyle, buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))
}

/// Build the CSV download for `records`, or `None` when there is nothing to export.
///
/// # Errors
///
/// Returns [`ExportError`] if the CSV writer fails.
pub fn export_csv<T: Tabular>(
    records: &[T],
    columns: &[Column],
    base: &str,
    date: Date,
) -> Result<Option<CsvExport>, ExportError> {
    if records.is_empty() {
        return Ok(None);
    }
    let body = render_csv(records, columns)?;
    Ok(Some(CsvExport { filename: export_filename(base, date), body }))
}

/// `{base}_{YYYY-MM-DD}.csv`
#[must_use]
pub fn export_filename(base: &str, date: Date) -> String {
    format!("{base}_{}.csv", iso_date(date))
}

fn iso_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

// =============================================================================
// TABLE VIEW
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    /// 1-based position in the collection.
    pub number: usize,
    pub id: Uuid,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

/// Project records for display. List cells join with `, `; absent cells are blank.
#[must_use]
pub fn table_view<T: Tabular>(records: &[T], columns: &[Column]) -> TableView {
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, record)| TableRow {
            number: i + 1,
            id: record.id(),
            cells: columns.iter().map(|c| record.cell(c.key).display()).collect(),
        })
        .collect();
    TableView { columns: columns.to_vec(), rows }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
