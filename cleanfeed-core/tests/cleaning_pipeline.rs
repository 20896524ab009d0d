//! End-to-end tests for the cleaning pipeline, driven through CSV files
//! the way the CLI drives it.

use std::fs;
use std::path::PathBuf;

use cleanfeed_core::{
    CleanError, CleaningConfig, CsvTableSource, DropReason, LoadError, MarketDataCleaner,
    MemoryAuditSink, SchemaError, StateError,
};
use tempfile::TempDir;

const MARKET_HEADER: &str =
    "Symbol,InstrumentType,Exchange,OpenPrice,HighPrice,LowPrice,ClosePrice,Volume,OpenInterest,Date";

/// Four rows mirroring the classic fixture: one clean, one with a bad
/// price, one with a bad date, one unknown to the catalog.
const MARKET_ROWS: &str = "\
AAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01
GOOG,Stock,NASDAQ,abc,155.0,149.0,154.0,1000000,5000,2024-04-01
AAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,invalid-date
FAKE,Stock,UNKNOWN,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01
";

const REFERENCE: &str = "\
Symbol,InstrumentType,Exchange,Status
AAPL,Stock,NASDAQ,Active
GOOG,Stock,NASDAQ,Active
";

struct Fixture {
    _dir: TempDir,
    market: PathBuf,
    reference: PathBuf,
}

fn write_fixture(market_csv: &str, reference_csv: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let market = dir.path().join("market.csv");
    let reference = dir.path().join("reference.csv");
    fs::write(&market, market_csv).unwrap();
    fs::write(&reference, reference_csv).unwrap();
    Fixture {
        _dir: dir,
        market,
        reference,
    }
}

fn standard_market() -> String {
    format!("{MARKET_HEADER}\n{MARKET_ROWS}")
}

fn load(cleaner: &mut MarketDataCleaner, fixture: &Fixture) {
    cleaner
        .load_data(&CsvTableSource, &fixture.market, &fixture.reference)
        .unwrap();
}

#[test]
fn cleaning_and_validation_keeps_only_the_valid_row() {
    let fixture = write_fixture(&standard_market(), REFERENCE);
    let sink = MemoryAuditSink::new();
    let config = CleaningConfig {
        track_dropped_rows: true,
        ..CleaningConfig::default()
    };
    let mut cleaner = MarketDataCleaner::with_audit_sink(config, Box::new(sink.clone()));

    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();
    let cleaned = cleaner.clean_data().unwrap();

    assert_eq!(cleaned.len(), 1);
    let row = &cleaned.rows()[0];
    let symbol_col = cleaned.column_index("Symbol").unwrap();
    assert_eq!(row.cells[symbol_col].as_text(), Some("AAPL"));

    // Two completeness drops (bad price, bad date) and one reference drop.
    let drops = sink.drops();
    assert_eq!(drops.len(), 3);
    assert_eq!(
        drops
            .iter()
            .filter(|d| d.reason == DropReason::IncompleteRow)
            .count(),
        2
    );
    assert_eq!(
        drops
            .iter()
            .filter(|d| d.reason == DropReason::UnknownInstrument)
            .count(),
        1
    );
}

#[test]
fn valid_row_values_pass_through_unchanged() {
    let fixture = write_fixture(&standard_market(), REFERENCE);
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let cleaned = cleaner.clean_data().unwrap();
    let row = &cleaned.rows()[0];
    let col = |name: &str| cleaned.column_index(name).unwrap();

    assert_eq!(row.cells[col("Symbol")].as_text(), Some("AAPL"));
    assert_eq!(row.cells[col("InstrumentType")].as_text(), Some("Stock"));
    assert_eq!(row.cells[col("Exchange")].as_text(), Some("NASDAQ"));
    assert_eq!(row.cells[col("OpenPrice")].as_number(), Some(150.0));
    assert_eq!(row.cells[col("ClosePrice")].as_number(), Some(154.0));
    assert_eq!(row.cells[col("Volume")].as_number(), Some(1_000_000.0));
    assert_eq!(row.cells[col("OpenInterest")].as_number(), Some(5000.0));
    assert_eq!(
        row.cells[col("Date")].as_date().map(|d| d.to_string()),
        Some("2024-04-01".to_string())
    );
}

#[test]
fn duplicate_and_empty_rows_are_removed() {
    // Five rows: the four standard ones plus a duplicate of the first,
    // and one fully-empty row. Only one row is otherwise valid.
    let market = format!(
        "{MARKET_HEADER}\n{MARKET_ROWS}AAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n,,,,,,,,,\n"
    );
    let fixture = write_fixture(&market, REFERENCE);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    assert_eq!(cleaner.clean_data().unwrap().len(), 1);
}

#[test]
fn identifier_whitespace_is_trimmed() {
    let market = format!(
        "{MARKET_HEADER}\n\" AAPL  \",Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n"
    );
    let fixture = write_fixture(&market, REFERENCE);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let cleaned = cleaner.clean_data().unwrap();
    assert_eq!(cleaned.len(), 1);
    let symbol_col = cleaned.column_index("Symbol").unwrap();
    assert_eq!(cleaned.rows()[0].cells[symbol_col].as_text(), Some("AAPL"));
}

#[test]
fn dotted_symbol_is_repaired_and_validated() {
    let market = format!(
        "{MARKET_HEADER}\nAAPL.NYSE,Stock,,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n"
    );
    let reference = "Symbol,InstrumentType,Exchange,Status\nAAPL,Stock,NYSE,Active\n";
    let fixture = write_fixture(&market, reference);

    let config = CleaningConfig {
        fix_dot_in_symbol: true,
        ..CleaningConfig::default()
    };
    let mut cleaner = MarketDataCleaner::new(config);
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let cleaned = cleaner.clean_data().unwrap();
    assert_eq!(cleaned.len(), 1);
    let row = &cleaned.rows()[0];
    assert_eq!(
        row.cells[cleaned.column_index("Symbol").unwrap()].as_text(),
        Some("AAPL")
    );
    assert_eq!(
        row.cells[cleaned.column_index("Exchange").unwrap()].as_text(),
        Some("NYSE")
    );
}

#[test]
fn repaired_symbol_still_requires_a_reference_match() {
    let market = format!(
        "{MARKET_HEADER}\nFAKE.NOWHERE,Stock,,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n"
    );
    let fixture = write_fixture(&market, REFERENCE);

    let config = CleaningConfig {
        fix_dot_in_symbol: true,
        ..CleaningConfig::default()
    };
    let mut cleaner = MarketDataCleaner::new(config);
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    assert!(cleaner.clean_data().unwrap().is_empty());
}

#[test]
fn inactive_instruments_are_rejected_by_default() {
    let reference = "Symbol,InstrumentType,Exchange,Status\nAAPL,Stock,NASDAQ,Inactive\n";
    let market = format!(
        "{MARKET_HEADER}\nAAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n"
    );
    let fixture = write_fixture(&market, reference);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();
    assert!(cleaner.clean_data().unwrap().is_empty());

    let config = CleaningConfig {
        validate_active_only: false,
        ..CleaningConfig::default()
    };
    let mut cleaner = MarketDataCleaner::new(config);
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();
    assert_eq!(cleaner.clean_data().unwrap().len(), 1);
}

#[test]
fn clean_is_idempotent_over_the_loaded_snapshot() {
    let fixture = write_fixture(&standard_market(), REFERENCE);
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);

    cleaner.clean().unwrap();
    let first = cleaner.clean_data().unwrap();
    cleaner.clean().unwrap();
    let second = cleaner.clean_data().unwrap();

    assert_eq!(first, second);
}

#[test]
fn surviving_rows_preserve_relative_order() {
    let market = format!(
        "{MARKET_HEADER}\n\
        GOOG,Stock,NASDAQ,140.0,145.0,139.0,144.0,2000000,,2024-04-01\n\
        FAKE,Stock,UNKNOWN,1.0,2.0,1.0,2.0,10,,2024-04-01\n\
        AAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-02\n"
    );
    let fixture = write_fixture(&market, REFERENCE);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let cleaned = cleaner.clean_data().unwrap();
    let symbol_col = cleaned.column_index("Symbol").unwrap();
    let symbols: Vec<_> = cleaned
        .rows()
        .iter()
        .map(|r| r.cells[symbol_col].as_text().unwrap().to_string())
        .collect();
    assert_eq!(symbols, ["GOOG", "AAPL"]);
}

#[test]
fn clean_fails_without_load() {
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    let err = cleaner.clean().unwrap_err();
    assert!(matches!(err, CleanError::State(StateError::NotLoaded)));
}

#[test]
fn clean_data_fails_without_clean() {
    let fixture = write_fixture(&standard_market(), REFERENCE);
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);

    assert_eq!(cleaner.clean_data(), Err(StateError::NotCleaned));
}

#[test]
fn missing_required_column_is_a_schema_error() {
    // No InstrumentType column at all.
    let market = "Symbol,Exchange,OpenPrice,HighPrice,LowPrice,ClosePrice,Volume,OpenInterest,Date\n\
        AAPL,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01\n";
    let fixture = write_fixture(market, REFERENCE);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);

    let err = cleaner.clean().unwrap_err();
    match err {
        CleanError::Schema(SchemaError::MissingColumn(column)) => {
            assert_eq!(column, "InstrumentType");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    // No partial result survives a fatal error.
    assert_eq!(cleaner.clean_data(), Err(StateError::NotCleaned));
}

#[test]
fn unreadable_source_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    let err = cleaner
        .load_data(
            &CsvTableSource,
            &dir.path().join("missing.csv"),
            &dir.path().join("also_missing.csv"),
        )
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn summary_reports_counts_for_the_cleaned_table() {
    let fixture = write_fixture(&standard_market(), REFERENCE);
    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let summary = cleaner.summary().unwrap();
    assert_eq!(summary.rows, 1);

    let open = summary
        .columns
        .iter()
        .find(|c| c.name == "OpenPrice")
        .unwrap();
    assert_eq!(open.missing, 0);
    let stats = open.numeric.as_ref().unwrap();
    assert_eq!(stats.min, 150.0);
    assert_eq!(stats.max, 150.0);

    let symbol = summary.columns.iter().find(|c| c.name == "Symbol").unwrap();
    assert!(symbol.numeric.is_none());
}

#[test]
fn extra_columns_are_carried_through() {
    let market = format!(
        "{MARKET_HEADER},Vendor\nAAPL,Stock,NASDAQ,150.0,155.0,149.0,154.0,1000000,5000,2024-04-01,bloomberg\n"
    );
    let fixture = write_fixture(&market, REFERENCE);

    let mut cleaner = MarketDataCleaner::new(CleaningConfig::default());
    load(&mut cleaner, &fixture);
    cleaner.clean().unwrap();

    let cleaned = cleaner.clean_data().unwrap();
    let vendor_col = cleaned.column_index("Vendor").unwrap();
    assert_eq!(
        cleaned.rows()[0].cells[vendor_col].as_text(),
        Some("bloomberg")
    );
}
