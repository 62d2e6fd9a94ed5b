//! Error taxonomy for the sampling pipeline.
//!
//! Source errors are per-rail and per-tick: the loop absorbs them by marking
//! the rail missing for that tick and carries on. Export errors surface once,
//! at shutdown, after the loop has already stopped.

use std::io;

use thiserror::Error;

/// A rail reading failed for this tick. Recoverable: the aggregator records
/// the rail as missing and the monitor keeps ticking.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The telemetry command is absent, timed out, or exited nonzero.
    #[error("telemetry unavailable: {0}")]
    Unavailable(String),

    /// The command ran but its output did not match the expected
    /// `value + unit suffix` shape.
    #[error("unparsable telemetry output: {0}")]
    Parse(String),
}

/// Chart export failed. Reported to the user at shutdown; never interrupts
/// the sampling loop, which has already finished by the time export runs.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export was requested before any sample was recorded. A defined edge
    /// case (stop before the first tick), not a crash.
    #[error("no samples recorded, nothing to chart")]
    EmptyHistory,

    /// The output path could not be written.
    #[error("cannot write chart: {0}")]
    Io(#[from] io::Error),

    /// The chart backend rejected the drawing operations.
    #[error("chart rendering failed: {0}")]
    Render(String),
}
