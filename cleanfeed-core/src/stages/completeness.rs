//! Completeness filter: rows must carry all four prices and a valid date.

use tracing::info;

use crate::audit::{AuditSink, DropReason, RowSnapshot};
use crate::domain::{SchemaError, Table};
use crate::schema;

/// Drop rows missing any price field or the date, post-coercion.
///
/// `Volume` and `OpenInterest` are informational; their absence never
/// drops a row. A missing date cell already covers unparsable dates, since
/// the coercer runs to completion before this stage. Returns the number of
/// rows removed.
pub fn filter_incomplete_rows(
    table: &mut Table,
    mut audit: Option<&mut dyn AuditSink>,
) -> Result<usize, SchemaError> {
    let mut required = Vec::with_capacity(schema::PRICE_COLUMNS.len() + 1);
    for name in schema::PRICE_COLUMNS {
        required.push(table.column_index(name)?);
    }
    required.push(table.column_index(schema::DATE)?);

    let before = table.len();

    // Decide and snapshot first; the retain pass below reshapes the table.
    let mut keep = Vec::with_capacity(table.len());
    for row in table.rows() {
        let complete = required.iter().all(|&col| !row.cells[col].is_missing());
        if !complete {
            if let Some(sink) = audit.as_mut() {
                sink.record_drop(RowSnapshot::capture(table, row), DropReason::IncompleteRow);
            }
        }
        keep.push(complete);
    }

    let mut index = 0;
    table.retain_rows(|_| {
        let keep_row = keep[index];
        index += 1;
        keep_row
    });

    info!(rows = table.len(), "rows after cleaning");
    Ok(before - table.len())
}
