//! CleanFeed Core — market-data cleaning against an instrument catalog.
//!
//! A single-pass, in-memory batch transform: load two delimited tables
//! (market records and the instrument reference catalog), normalize and
//! filter the market rows against the catalog, and hand back a trustworthy
//! table for downstream consumption.
//!
//! The pipeline runs a fixed stage sequence:
//! 1. Identifier normalization, plus the optional dotted-symbol repair
//! 2. Empty-row and exact-duplicate removal
//! 3. Numeric/date type coercion: parse failures become missing values
//! 4. Completeness filtering: all four prices and a valid date required
//! 5. Reference validation: semi-join on (symbol, type, exchange)
//!
//! Rows removed by the filtering stages can be reported to an
//! [`audit::AuditSink`] for diagnostics; sinks never affect the output.

pub mod audit;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod stages;

pub use audit::{AuditSink, DropReason, DropRecord, MemoryAuditSink, RowSnapshot, TracingAuditSink};
pub use config::CleaningConfig;
pub use domain::{Cell, Row, RowId, SchemaError, Table};
pub use pipeline::{
    CleanError, CleanSummary, ColumnSummary, MarketDataCleaner, NumericStats, StateError,
};
pub use source::{CsvTableSink, CsvTableSource, LoadError, TableSink, TableSource, WriteError};
