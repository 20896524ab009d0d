//! Canonical column names for the market and reference tables.
//!
//! Columns are addressed by header name, not position. A stage that needs
//! a column it cannot find raises `SchemaError` at that point; there is no
//! up-front schema validation pass.

/// Market and reference identifier columns.
pub const SYMBOL: &str = "Symbol";
pub const INSTRUMENT_TYPE: &str = "InstrumentType";
pub const EXCHANGE: &str = "Exchange";

/// Market value columns.
pub const OPEN_PRICE: &str = "OpenPrice";
pub const HIGH_PRICE: &str = "HighPrice";
pub const LOW_PRICE: &str = "LowPrice";
pub const CLOSE_PRICE: &str = "ClosePrice";
pub const VOLUME: &str = "Volume";
pub const OPEN_INTEREST: &str = "OpenInterest";
pub const DATE: &str = "Date";

/// Reference catalog status column.
pub const STATUS: &str = "Status";

/// Status value an instrument must carry when the reference set is
/// restricted to active instruments.
pub const STATUS_ACTIVE: &str = "Active";

/// Identifier columns normalized by the pipeline.
pub const IDENTIFIER_COLUMNS: [&str; 3] = [SYMBOL, INSTRUMENT_TYPE, EXCHANGE];

/// Price columns that must all be present for a row to survive the
/// completeness filter.
pub const PRICE_COLUMNS: [&str; 4] = [OPEN_PRICE, HIGH_PRICE, LOW_PRICE, CLOSE_PRICE];

/// Columns coerced to numbers. `Volume` and `OpenInterest` are
/// informational and never cause a row drop on their own.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    OPEN_PRICE,
    HIGH_PRICE,
    LOW_PRICE,
    CLOSE_PRICE,
    VOLUME,
    OPEN_INTEREST,
];
