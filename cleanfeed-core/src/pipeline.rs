//! The cleaning pipeline state machine.
//!
//! `Unloaded --load_data()--> Loaded --clean()--> Cleaned`. A pipeline
//! instance serves one dataset; `clean()` always re-runs from the loaded
//! snapshot, never from prior cleaned output, so repeated calls are
//! deterministic and idempotent.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::config::CleaningConfig;
use crate::domain::{Cell, SchemaError, Table};
use crate::source::{LoadError, TableSource};
use crate::stages;

/// A pipeline operation was invoked out of sequence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("data not loaded: call load_data() first")]
    NotLoaded,

    #[error("data has not been cleaned yet: call clean() first")]
    NotCleaned,
}

/// Fatal cleaning failure.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Cleans one batch of market data against an instrument catalog.
///
/// Owns the loaded tables exclusively for the duration of a `clean()`
/// call; [`MarketDataCleaner::clean_data`] returns an independent copy so
/// callers cannot mutate pipeline-internal state.
pub struct MarketDataCleaner {
    config: CleaningConfig,
    audit: Box<dyn AuditSink>,
    market: Option<Table>,
    reference: Option<Table>,
    cleaned: Option<Table>,
}

impl MarketDataCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self::with_audit_sink(config, Box::new(TracingAuditSink))
    }

    /// Pipeline with a caller-supplied audit sink (lets tests observe drop
    /// records instead of reading log output).
    pub fn with_audit_sink(config: CleaningConfig, audit: Box<dyn AuditSink>) -> Self {
        Self {
            config,
            audit,
            market: None,
            reference: None,
            cleaned: None,
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Read both input tables through `source`. Transitions to `Loaded`.
    ///
    /// No business validation happens here; a file that cannot be read or
    /// parsed as a table fails with [`LoadError`].
    pub fn load_data(
        &mut self,
        source: &dyn TableSource,
        market_path: &Path,
        reference_path: &Path,
    ) -> Result<(), LoadError> {
        info!("loading market and reference data");
        let market = source.read_table(market_path)?;
        let reference = source.read_table(reference_path)?;
        info!(rows = market.len(), "market data rows");
        info!(rows = reference.len(), "reference data rows");
        self.load_tables(market, reference);
        Ok(())
    }

    /// Inject already-built tables. Transitions to `Loaded` and discards
    /// any previous cleaned output.
    pub fn load_tables(&mut self, market: Table, reference: Table) {
        self.market = Some(market);
        self.reference = Some(reference);
        self.cleaned = None;
    }

    /// Run the full cleaning sequence over the loaded snapshot.
    ///
    /// Fails with [`StateError::NotLoaded`] before `load_data`, and with
    /// [`SchemaError`] as soon as a stage references a column the input
    /// does not carry — no partial result is kept in that case.
    pub fn clean(&mut self) -> Result<(), CleanError> {
        let (market, reference) = match (&self.market, &self.reference) {
            (Some(market), Some(reference)) => (market, reference),
            _ => return Err(StateError::NotLoaded.into()),
        };

        // Work on a copy so a second clean() starts from the same snapshot.
        let mut working = market.clone();

        let corrections = stages::normalize_identifiers(&mut working, &self.config)?;
        if corrections > 0 {
            info!(corrections, "applied dotted-symbol corrections");
        }

        stages::drop_empty_and_duplicate_rows(&mut working);
        stages::coerce_types(&mut working)?;

        let track = self.config.track_dropped_rows;
        let sink: Option<&mut dyn AuditSink> =
            if track { Some(&mut *self.audit) } else { None };
        stages::filter_incomplete_rows(&mut working, sink)?;

        let sink: Option<&mut dyn AuditSink> =
            if track { Some(&mut *self.audit) } else { None };
        stages::validate_against_reference(&mut working, reference, &self.config, sink)?;

        self.cleaned = Some(working);
        Ok(())
    }

    /// Independent copy of the cleaned table, row order preserved and
    /// positional index reset.
    pub fn clean_data(&self) -> Result<Table, StateError> {
        self.cleaned.clone().ok_or(StateError::NotCleaned)
    }

    /// Per-column summary of the cleaned table, logged at info level.
    pub fn summary(&self) -> Result<CleanSummary, StateError> {
        let cleaned = self.cleaned.as_ref().ok_or(StateError::NotCleaned)?;

        let mut columns = Vec::with_capacity(cleaned.columns().len());
        for (idx, name) in cleaned.columns().iter().enumerate() {
            let mut missing = 0usize;
            let mut numbers: Vec<f64> = Vec::new();
            for row in cleaned.rows() {
                match &row.cells[idx] {
                    Cell::Missing => missing += 1,
                    Cell::Number(n) => numbers.push(*n),
                    _ => {}
                }
            }
            columns.push(ColumnSummary {
                name: name.clone(),
                missing,
                numeric: NumericStats::over(&numbers),
            });
        }

        let summary = CleanSummary {
            rows: cleaned.len(),
            columns,
        };

        info!(rows = summary.rows, "summary of cleaned data");
        for col in &summary.columns {
            match &col.numeric {
                Some(stats) => info!(
                    column = %col.name,
                    missing = col.missing,
                    min = stats.min,
                    mean = stats.mean,
                    max = stats.max,
                    "column summary"
                ),
                None => info!(column = %col.name, missing = col.missing, "column summary"),
            }
        }
        Ok(summary)
    }
}

/// Summary statistics for a cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
    /// Present only for columns holding at least one number.
    pub numeric: Option<NumericStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl NumericStats {
    fn over(numbers: &[f64]) -> Option<Self> {
        if numbers.is_empty() {
            return None;
        }
        let sum: f64 = numbers.iter().sum();
        Some(Self {
            min: numbers.iter().copied().fold(f64::INFINITY, f64::min),
            mean: sum / numbers.len() as f64,
            max: numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
