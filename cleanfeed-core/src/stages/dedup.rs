//! Empty-row and exact-duplicate removal.
//!
//! These removals are structural cleanup, not data-quality judgments, and
//! are not reported to the audit sink; drop tracking starts with the
//! completeness filter.

use std::collections::HashSet;

use chrono::Datelike;
use tracing::debug;

use crate::domain::{Cell, Row, Table};

/// Rows removed by [`drop_empty_and_duplicate_rows`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    pub empty_rows: usize,
    pub duplicate_rows: usize,
}

/// Remove rows where every cell is missing, then exact duplicates (all
/// cells equal), keeping the first occurrence. Relative order of the
/// surviving rows is preserved.
pub fn drop_empty_and_duplicate_rows(table: &mut Table) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    let mut seen: HashSet<[u8; 32]> = HashSet::new();

    table.retain_rows(|row| {
        if row.cells.iter().all(Cell::is_missing) {
            outcome.empty_rows += 1;
            return false;
        }
        if !seen.insert(row_fingerprint(row)) {
            outcome.duplicate_rows += 1;
            return false;
        }
        true
    });

    if outcome.empty_rows > 0 || outcome.duplicate_rows > 0 {
        debug!(
            empty = outcome.empty_rows,
            duplicates = outcome.duplicate_rows,
            "removed empty and duplicate rows"
        );
    }
    outcome
}

/// Content fingerprint over all cells, independent of the row id.
///
/// Each cell is tagged with a variant byte and text is length-delimited,
/// so distinct rows cannot encode to the same byte stream.
fn row_fingerprint(row: &Row) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for cell in &row.cells {
        match cell {
            Cell::Missing => {
                hasher.update(&[0u8]);
            }
            Cell::Text(s) => {
                hasher.update(&[1u8]);
                hasher.update(&(s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
            Cell::Number(n) => {
                hasher.update(&[2u8]);
                hasher.update(&n.to_le_bytes());
            }
            Cell::Date(d) => {
                hasher.update(&[3u8]);
                hasher.update(&d.num_days_from_ce().to_le_bytes());
            }
        }
    }
    *hasher.finalize().as_bytes()
}
