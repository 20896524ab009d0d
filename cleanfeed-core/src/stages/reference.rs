//! Referential validation against the instrument catalog.

use std::collections::HashSet;

use tracing::info;

use crate::audit::{AuditSink, DropReason, RowSnapshot};
use crate::config::CleaningConfig;
use crate::domain::{Cell, SchemaError, Table};
use crate::schema;

/// Outcome of the reference-validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Distinct triples in the effective (status-filtered) reference set.
    pub reference_keys: usize,
}

/// Keep market rows whose (symbol, instrument type, exchange) triple
/// exists in the effective reference set.
///
/// The reference table's identifier columns may carry whitespace of their
/// own even when the market table's don't, so keys are trimmed on both
/// sides. Membership is a set test over the composite key (all three
/// parts match simultaneously, case-sensitively), so a triple matching
/// several reference rows still yields exactly one output row.
pub fn validate_against_reference(
    table: &mut Table,
    reference: &Table,
    config: &CleaningConfig,
    mut audit: Option<&mut dyn AuditSink>,
) -> Result<ValidationOutcome, SchemaError> {
    let keys = reference_keys(reference, config)?;

    let symbol_col = table.column_index(schema::SYMBOL)?;
    let type_col = table.column_index(schema::INSTRUMENT_TYPE)?;
    let exchange_col = table.column_index(schema::EXCHANGE)?;

    let rows_before = table.len();
    let mut keep = Vec::with_capacity(table.len());
    for row in table.rows() {
        let known = match (
            text_key(&row.cells[symbol_col]),
            text_key(&row.cells[type_col]),
            text_key(&row.cells[exchange_col]),
        ) {
            (Some(symbol), Some(kind), Some(exchange)) => {
                keys.contains(&(symbol, kind, exchange))
            }
            _ => false,
        };
        if !known {
            if let Some(sink) = audit.as_mut() {
                sink.record_drop(
                    RowSnapshot::capture(table, row),
                    DropReason::UnknownInstrument,
                );
            }
        }
        keep.push(known);
    }

    let mut index = 0;
    table.retain_rows(|_| {
        let keep_row = keep[index];
        index += 1;
        keep_row
    });

    let outcome = ValidationOutcome {
        rows_before,
        rows_after: table.len(),
        reference_keys: keys.len(),
    };
    info!(
        before = outcome.rows_before,
        after = outcome.rows_after,
        dropped = outcome.rows_before - outcome.rows_after,
        "rows after reference validation"
    );
    Ok(outcome)
}

/// Build the effective reference key set: optionally status-filtered,
/// identifiers trimmed.
fn reference_keys(
    reference: &Table,
    config: &CleaningConfig,
) -> Result<HashSet<(String, String, String)>, SchemaError> {
    let symbol_col = reference.column_index(schema::SYMBOL)?;
    let type_col = reference.column_index(schema::INSTRUMENT_TYPE)?;
    let exchange_col = reference.column_index(schema::EXCHANGE)?;
    // The status column only matters (and is only required) when the
    // reference set is restricted to active instruments.
    let status_col = if config.validate_active_only {
        Some(reference.column_index(schema::STATUS)?)
    } else {
        None
    };

    let mut keys = HashSet::new();
    for row in reference.rows() {
        if let Some(col) = status_col {
            if row.cells[col].as_text() != Some(schema::STATUS_ACTIVE) {
                continue;
            }
        }
        let (Some(symbol), Some(kind), Some(exchange)) = (
            text_key(&row.cells[symbol_col]),
            text_key(&row.cells[type_col]),
            text_key(&row.cells[exchange_col]),
        ) else {
            continue;
        };
        keys.insert((symbol, kind, exchange));
    }
    Ok(keys)
}

/// Trimmed text content of an identifier cell; non-text cells carry no key.
fn text_key(cell: &Cell) -> Option<String> {
    cell.as_text().map(|s| s.trim().to_string())
}
