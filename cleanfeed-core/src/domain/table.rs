use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cell::Cell;

/// Stable row handle assigned once at load time.
///
/// Survives filtering and in-place mutation, so audit records can name the
/// original row even after the working table has been reshaped. The
/// positional index of a row is simply its `Vec` index and is reset by
/// filtering; `RowId` is not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A required column was absent from an input table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

/// One table row: a load-time identity plus one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

/// Row-oriented in-memory table with named columns.
///
/// Column names are preserved exactly as read from the source header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    next_id: u64,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            next_id: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column, or `SchemaError` if the header is absent.
    pub fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    /// Append a row, assigning it the next stable id.
    pub fn push_row(&mut self, cells: Vec<Cell>) -> RowId {
        debug_assert_eq!(cells.len(), self.columns.len());
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row { id, cells });
        id
    }

    /// Keep only rows for which `keep` returns true, preserving order.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(|row| keep(row));
    }
}
