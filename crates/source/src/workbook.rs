//! Workbook-backed record source (xlsx, xls, xlsb, ods).
//!
//! The first row of the configured sheet holds the column headers; every
//! following row is one recipient. Empty cells are absent fields and rows with
//! no values at all are skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{Data, Reader, open_workbook_auto};

use herald_common::config::{ColumnMap, SourceConfig};
use herald_common::types::RecipientRecord;

use crate::{RecordSource, SourceError};

/// Reads recipients from one sheet of a spreadsheet file.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    sheet: String,
    columns: ColumnMap,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>, columns: ColumnMap) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            columns,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.path, &config.sheet, config.columns.clone())
    }

    /// Blocking read of the whole sheet.
    fn read_blocking(
        path: &Path,
        sheet: &str,
        columns: &ColumnMap,
    ) -> Result<Vec<RecipientRecord>, SourceError> {
        if !path.exists() {
            return Err(SourceError::FileMissing(path.display().to_string()));
        }

        let mut workbook =
            open_workbook_auto(path).map_err(|e| SourceError::Workbook(e.to_string()))?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(SourceError::SheetMissing(sheet.to_string()));
        }

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| SourceError::Workbook(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(row) => row
                .iter()
                .map(|cell| cell_text(cell).unwrap_or_default())
                .collect(),
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .filter_map(|row| record_from_row(&headers, row, columns))
            .collect())
    }
}

#[async_trait]
impl RecordSource for WorkbookSource {
    async fn load(&self) -> Result<Vec<RecipientRecord>, SourceError> {
        let path = self.path.clone();
        let sheet = self.sheet.clone();
        let columns = self.columns.clone();

        let records =
            tokio::task::spawn_blocking(move || Self::read_blocking(&path, &sheet, &columns))
                .await
                .map_err(|e| SourceError::Internal(e.to_string()))??;

        tracing::info!(
            path = %self.path.display(),
            sheet = %self.sheet,
            records = records.len(),
            "Loaded recipient records"
        );

        Ok(records)
    }

    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.sheet)
    }
}

/// Map one data row onto a record using the header row.
///
/// Returns `None` when every cell of the row is empty.
pub fn record_from_row(
    headers: &[String],
    row: &[Data],
    columns: &ColumnMap,
) -> Option<RecipientRecord> {
    let cells: HashMap<&str, &Data> = headers
        .iter()
        .zip(row.iter())
        .filter(|(_, cell)| !matches!(cell, Data::Empty))
        .map(|(header, cell)| (header.as_str(), cell))
        .collect();

    if cells.is_empty() {
        return None;
    }

    let text = |column: &str| cells.get(column).and_then(|cell| cell_text(cell));

    Some(RecipientRecord {
        display_name: text(columns.name.as_str()),
        email_address: text(columns.email.as_str()),
        phone_number: text(columns.phone.as_str()),
        payload: cells.get(columns.data.as_str()).and_then(|cell| cell_value(cell)),
        channel: text(columns.channel.as_str()),
    })
}

/// Render a cell as trimmed text. Whole numbers lose their fractional part so
/// phone numbers stored as numeric cells come out as plain digits.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Render a cell as a payload value, keeping numbers and booleans typed.
fn cell_value(cell: &Data) -> Option<serde_json::Value> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(serde_json::Value::from(*i)),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            Some(serde_json::Value::from(*f as i64))
        }
        Data::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
        Data::Bool(b) => Some(serde_json::Value::Bool(*b)),
        other => cell_text(other).map(serde_json::Value::String),
    }
}
