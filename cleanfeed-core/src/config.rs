//! Cleaning pipeline configuration.

use serde::{Deserialize, Serialize};

/// Feature flags for one cleaning run.
///
/// A single pipeline handles every variant; behavioral differences are
/// flag-gated here rather than living in separate code paths. The struct
/// is immutable for the life of a pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Restrict the reference set to rows with status `"Active"` before
    /// validating market rows against it.
    pub validate_active_only: bool,

    /// Report every row removed by a filtering stage to the audit sink.
    pub track_dropped_rows: bool,

    /// Split a symbol of the form `"X.Y"` into symbol `X`, exchange `Y`
    /// when the exchange field is blank.
    pub fix_dot_in_symbol: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            validate_active_only: true,
            track_dropped_rows: false,
            fix_dot_in_symbol: false,
        }
    }
}
