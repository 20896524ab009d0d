//! Table I/O — the collaborator seam that supplies input tables and
//! receives the cleaned output.
//!
//! The pipeline itself never touches the filesystem; it consumes a
//! [`TableSource`] capability and hands results to a [`TableSink`], so
//! callers can swap implementations and tests can inject tables directly.

use std::fs::File;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::{Cell, Table};

/// A source of delimited tabular data was unreadable or unparseable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed table: {0}")]
    Malformed(#[from] csv::Error),
}

/// Failed to persist a table.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode table: {0}")]
    Csv(#[from] csv::Error),
}

/// Capability to read a delimited file into a [`Table`].
pub trait TableSource {
    fn read_table(&self, path: &Path) -> Result<Table, LoadError>;
}

/// Capability to persist a [`Table`] as a delimited file.
pub trait TableSink {
    fn write_table(&self, table: &Table, path: &Path) -> Result<(), WriteError>;
}

/// Reads comma-delimited files with a header row.
///
/// Headers are preserved verbatim. Empty fields load as `Cell::Missing`;
/// every other field is kept untouched as text — no business validation
/// happens here.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvTableSource;

impl TableSource for CsvTableSource {
    fn read_table(&self, path: &Path) -> Result<Table, LoadError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(headers);

        for record in reader.records() {
            let record = record?;
            let cells = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Missing
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            table.push_row(cells);
        }

        info!(path = %path.display(), rows = table.len(), "loaded table");
        Ok(table)
    }
}

/// Writes a table back out as comma-delimited text, one header row first.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvTableSink;

impl TableSink for CsvTableSink {
    fn write_table(&self, table: &Table, path: &Path) -> Result<(), WriteError> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.cells.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = table.len(), "wrote table");
        Ok(())
    }
}
