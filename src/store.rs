//! Tabular input and output
//!
//! The output table is always rewritten in full, so a crash loses at most
//! the URL being processed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::record::Record;

/// Column of the input table holding the URLs to visit
pub const DEFAULT_URL_COLUMN: &str = "Product Link";

/// Destination for the accumulated record table
pub trait RecordSink {
    /// Replace the persisted table with `records`
    fn persist(&mut self, records: &[Record]) -> Result<(), StoreError>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn persist(&mut self, records: &[Record]) -> Result<(), StoreError> {
        (**self).persist(records)
    }
}

/// CSV file rewritten through a temporary file and a rename
pub struct CsvSink {
    path: PathBuf,
    columns: Vec<String>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, columns: &[&str]) -> Self {
        Self {
            path: path.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RecordSink for CsvSink {
    fn persist(&mut self, records: &[Record]) -> Result<(), StoreError> {
        let tmp = tmp_path(&self.path);

        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(&self.columns)?;
            for record in records {
                writer.write_record(record.values())?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), rows = records.len(), "Saved progress");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Non-empty values of `column` from a CSV input table, in row order
pub fn read_url_column(path: &Path, column: &str) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let index = reader
        .headers()?
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| StoreError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut urls = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(value) = row.get(index).map(str::trim) {
            if !value.is_empty() {
                urls.push(value.to_string());
            }
        }
    }

    Ok(urls)
}
