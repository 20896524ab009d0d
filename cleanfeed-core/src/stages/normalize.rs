//! Identifier normalization and the optional dotted-symbol repair.

use tracing::info;

use crate::config::CleaningConfig;
use crate::domain::{Cell, Row, SchemaError, Table};
use crate::schema;

/// Trim the identifier columns and blank out empty exchanges; when
/// enabled, split `"SYMBOL.EXCHANGE"` composites into their parts.
///
/// This is the first stage to reference the identifier columns, so an
/// absent column surfaces here as `SchemaError` before any row is
/// processed. Row count is unchanged. Returns the number of dotted-symbol
/// corrections applied.
pub fn normalize_identifiers(
    table: &mut Table,
    config: &CleaningConfig,
) -> Result<usize, SchemaError> {
    let symbol_col = table.column_index(schema::SYMBOL)?;
    let type_col = table.column_index(schema::INSTRUMENT_TYPE)?;
    let exchange_col = table.column_index(schema::EXCHANGE)?;

    let mut corrections = 0;
    for row in table.rows_mut() {
        for col in [symbol_col, type_col, exchange_col] {
            trim_cell(&mut row.cells[col]);
        }

        // An empty exchange is missing, so the dotted-symbol repair below
        // and the reference match later see one consistent encoding.
        if row.cells[exchange_col].as_text() == Some("") {
            row.cells[exchange_col] = Cell::Missing;
        }

        if config.fix_dot_in_symbol && fix_dotted_symbol(row, symbol_col, exchange_col) {
            corrections += 1;
        }
    }

    Ok(corrections)
}

fn trim_cell(cell: &mut Cell) {
    if let Cell::Text(value) = cell {
        if value.trim().len() != value.len() {
            let trimmed = value.trim().to_string();
            *value = trimmed;
        }
    }
}

/// Best-effort repair of a composite `"SYMBOL.EXCHANGE"` encoding.
///
/// Applies only when the symbol contains a dot and the exchange is
/// missing. The symbol is split on its last dot and both parts must be
/// non-empty. The result is not checked against the reference catalog
/// here; rows that still don't match are dropped by the reference
/// validator.
fn fix_dotted_symbol(row: &mut Row, symbol_col: usize, exchange_col: usize) -> bool {
    if !row.cells[exchange_col].is_missing() {
        return false;
    }

    let split = row.cells[symbol_col].as_text().and_then(|symbol| {
        match symbol.rsplit_once('.') {
            Some((sym, exch)) if !sym.is_empty() && !exch.is_empty() => {
                Some((symbol.to_string(), sym.to_string(), exch.to_string()))
            }
            _ => None,
        }
    });

    let Some((original, symbol_part, exchange_part)) = split else {
        return false;
    };

    info!(
        row = row.id.0,
        "split dotted symbol '{original}' into symbol '{symbol_part}' and exchange '{exchange_part}'"
    );
    row.cells[symbol_col] = Cell::Text(symbol_part);
    row.cells[exchange_col] = Cell::Text(exchange_part);
    true
}
