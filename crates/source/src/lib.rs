//! Recipient record sources.
//!
//! A source yields the full, ordered list of recipients for one run. The
//! dispatch loop treats any [`SourceError`] as "no records" and aborts the run
//! before sending anything.

pub mod workbook;

use async_trait::async_trait;
use thiserror::Error;

use herald_common::types::RecipientRecord;

pub use workbook::WorkbookSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("records file {0} does not exist")]
    FileMissing(String),

    #[error("sheet \"{0}\" does not exist in the workbook")]
    SheetMissing(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Trait that every recipient source must implement.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read all recipient records, in source order.
    async fn load(&self) -> Result<Vec<RecipientRecord>, SourceError>;

    /// Human-readable description for logs (e.g. the file path).
    fn describe(&self) -> String;
}

/// Source backed by a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<RecipientRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<RecipientRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn load(&self) -> Result<Vec<RecipientRecord>, SourceError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} records)", self.records.len())
    }
}
