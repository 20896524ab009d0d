//! Column type coercion: numeric and date parsing with missing-on-failure.

use chrono::NaiveDate;

use crate::domain::{Cell, SchemaError, Table};
use crate::schema;

/// Date formats attempted in order: ISO first, then the regional encodings
/// commonly seen in vendor exports.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

/// Coerce the numeric columns to `Number` and the date column to `Date`.
///
/// A cell that fails to parse becomes `Missing`; coercion never fails a
/// row or the batch. The completeness filter decides each row's fate
/// afterwards. Columns are converted independently of one another.
pub fn coerce_types(table: &mut Table) -> Result<(), SchemaError> {
    for name in schema::NUMERIC_COLUMNS {
        let col = table.column_index(name)?;
        for row in table.rows_mut() {
            row.cells[col] = coerce_number(&row.cells[col]);
        }
    }

    let date_col = table.column_index(schema::DATE)?;
    for row in table.rows_mut() {
        row.cells[date_col] = coerce_date(&row.cells[date_col]);
    }

    Ok(())
}

fn coerce_number(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(n) => Cell::Number(*n),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if !n.is_nan() => Cell::Number(n),
            _ => Cell::Missing,
        },
        _ => Cell::Missing,
    }
}

fn coerce_date(cell: &Cell) -> Cell {
    match cell {
        Cell::Date(d) => Cell::Date(*d),
        Cell::Text(s) => {
            let text = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map_or(Cell::Missing, Cell::Date)
        }
        _ => Cell::Missing,
    }
}
