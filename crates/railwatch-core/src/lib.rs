//! # railwatch-core
//!
//! Sampling and aggregation pipeline for the railwatch power monitor.
//!
//! The Raspberry Pi PMIC reports per-rail current and voltage through
//! `vcgencmd pmic_read_adc`; this crate turns that into a fixed-cadence
//! monitoring pipeline:
//!
//! ```text
//! PowerSource -> Aggregator (History + MetricsSnapshot) -> renderers / export
//! ```
//!
//! - [`PowerSource`] adapts the firmware command into labeled watt readings;
//!   per-rail failures are per-tick and recoverable.
//! - [`Aggregator`] owns the append-only [`History`] and keeps the rolling
//!   [`MetricsSnapshot`] in step with it on every tick; the snapshot is
//!   always reconstructable from the history alone.
//! - [`Monitor`] is the Idle -> Running -> Stopped loop the CLI drives.
//! - [`chart::export`] renders a finished run to an SVG chart with the
//!   summary statistics on the figure.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use railwatch_core::{Monitor, PmicAdcSource, PowerSource};
//!
//! let source = PmicAdcSource::new();
//! let rails = source.detect_rails()?;
//! let mut monitor = Monitor::new(Box::new(source), rails, Duration::from_secs(1));
//!
//! monitor.start();
//! let sample = monitor.tick();
//! println!("{:.3} W", sample.total);
//! # Ok::<(), railwatch_core::SourceError>(())
//! ```

pub mod chart;
pub mod error;
pub mod history;
pub mod metrics;
pub mod monitor;
pub mod reading;
pub mod source;
pub mod sources;

pub use error::{ExportError, SourceError};
pub use history::History;
pub use metrics::{Aggregator, MetricsSnapshot};
pub use monitor::{Monitor, MonitorState};
pub use reading::{RailSample, Reading, Sample};
pub use source::PowerSource;
pub use sources::mock::MockPowerSource;
pub use sources::pmic::PmicAdcSource;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
