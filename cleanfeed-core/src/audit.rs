//! Drop auditing — a cross-cutting diagnostic sink.
//!
//! Every filtering stage that removes rows reports each removal here when
//! drop tracking is enabled. Sinks observe; they never change row count or
//! ordering. Empty-row and duplicate removal is structural cleanup and is
//! not reported (tracking starts with the completeness filter).

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::domain::{Row, RowId, Table};

/// Why a row was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A required price field or the date was missing after coercion.
    IncompleteRow,
    /// The (symbol, instrument type, exchange) triple has no match in the
    /// effective reference set.
    UnknownInstrument,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::IncompleteRow => f.write_str("missing price data or date"),
            DropReason::UnknownInstrument => f.write_str("invalid instrument reference"),
        }
    }
}

/// Full-row snapshot, captured before any further mutation of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    pub row_id: RowId,
    /// Every column of the row as (name, rendered value).
    pub fields: Vec<(String, String)>,
}

impl RowSnapshot {
    pub fn capture(table: &Table, row: &Row) -> Self {
        let fields = table
            .columns()
            .iter()
            .zip(&row.cells)
            .map(|(name, cell)| (name.clone(), cell.to_string()))
            .collect();
        Self {
            row_id: row.id,
            fields,
        }
    }
}

impl fmt::Display for RowSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// One drop as observed by a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DropRecord {
    pub snapshot: RowSnapshot,
    pub reason: DropReason,
}

/// Receives one record per dropped row. Diagnostic only.
pub trait AuditSink {
    fn record_drop(&mut self, snapshot: RowSnapshot, reason: DropReason);
}

/// Emits one warning log event per dropped row.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_drop(&mut self, snapshot: RowSnapshot, reason: DropReason) {
        warn!(row = snapshot.row_id.0, "dropped row due to {reason}: {snapshot}");
    }
}

/// Collects drop records behind a shared handle, so a caller can hand the
/// sink to the pipeline and still inspect what was reported.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    drops: Arc<Mutex<Vec<DropRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drops(&self) -> Vec<DropRecord> {
        self.drops.lock().expect("audit sink lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.drops.lock().expect("audit sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record_drop(&mut self, snapshot: RowSnapshot, reason: DropReason) {
        self.drops
            .lock()
            .expect("audit sink lock poisoned")
            .push(DropRecord { snapshot, reason });
    }
}
