//! Readings and per-tick samples.
//!
//! A [`Reading`] is one rail measurement as produced by a source adapter. The
//! aggregator folds the readings of one tick into a [`Sample`], the unit the
//! history is made of.

use std::time::Instant;

use serde::Serialize;

/// One rail measurement in watts, stamped when it was taken.
///
/// Immutable once produced by a source adapter.
#[derive(Debug, Clone)]
pub struct Reading {
    /// Rail label as reported by the PMIC (e.g. `VDD_CORE`).
    pub rail: String,
    /// Instantaneous power draw in watts.
    pub watts: f64,
    /// When the reading was taken.
    pub taken_at: Instant,
}

impl Reading {
    pub fn new(rail: impl Into<String>, watts: f64) -> Self {
        Self {
            rail: rail.into(),
            watts,
            taken_at: Instant::now(),
        }
    }
}

/// A rail's value within one tick. `None` marks a reading that failed this
/// tick; the rail stays in the sample so the gap is visible, it is just
/// excluded from the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailSample {
    pub rail: String,
    pub watts: Option<f64>,
}

/// Every rail value for one tick plus the derived total.
///
/// Missing rails are excluded from the total, not zero-filled. Immutable
/// after creation; appended to the history by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Seconds since the monitor started when this tick was recorded.
    pub elapsed_secs: f64,
    /// Per-rail values in the tracked rail order.
    pub rails: Vec<RailSample>,
    /// Sum of the successfully read rail values.
    pub total: f64,
}

impl Sample {
    /// Number of rails that failed to read this tick.
    pub fn missing(&self) -> usize {
        self.rails.iter().filter(|r| r.watts.is_none()).count()
    }

    /// The rail drawing the most power this tick, if any reading succeeded.
    pub fn top_rail(&self) -> Option<(&str, f64)> {
        self.rails
            .iter()
            .filter_map(|r| r.watts.map(|w| (r.rail.as_str(), w)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
