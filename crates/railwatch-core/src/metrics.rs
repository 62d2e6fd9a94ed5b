//! Rolling aggregation of tick samples into summary statistics.
//!
//! The [`Aggregator`] owns the run history and keeps a [`MetricsSnapshot`]
//! in step with it: every recorded tick updates the snapshot incrementally,
//! and [`MetricsSnapshot::compute`] rebuilds the same value from the history
//! alone. Both paths share one fold, so they cannot drift apart.

use std::time::Duration;

use serde::Serialize;

use crate::error::SourceError;
use crate::history::History;
use crate::reading::{RailSample, Reading, Sample};

/// Summary statistics over the history as of the latest tick.
///
/// Timestamps are seconds since the monitor started. Ties on min/max keep
/// the earlier tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Number of samples folded in so far.
    pub ticks: usize,
    /// Lowest tick total seen, and when.
    pub min_watts: f64,
    pub min_at_secs: f64,
    /// Highest tick total seen, and when.
    pub max_watts: f64,
    pub peak_at_secs: f64,
    /// Cumulative mean of the tick totals.
    pub avg_watts: f64,
    /// Trapezoidal integral of total power over elapsed time, in joules.
    pub energy_joules: f64,
    /// Rail with the highest instantaneous draw on the tick that set the
    /// current maximum. `None` when that tick had no successful reading.
    pub top_rail_at_peak: Option<String>,
}

impl MetricsSnapshot {
    /// Snapshot after the first sample. With no previous tick to integrate
    /// against, the first tick contributes `total * interval` of energy.
    fn first(sample: &Sample, interval: Duration) -> Self {
        Self {
            ticks: 1,
            min_watts: sample.total,
            min_at_secs: sample.elapsed_secs,
            max_watts: sample.total,
            peak_at_secs: sample.elapsed_secs,
            avg_watts: sample.total,
            energy_joules: sample.total * interval.as_secs_f64(),
            top_rail_at_peak: sample.top_rail().map(|(rail, _)| rail.to_string()),
        }
    }

    /// Fold one more sample in. `prev` is the immediately preceding sample.
    fn absorb(&mut self, prev: &Sample, sample: &Sample) {
        self.ticks += 1;
        self.avg_watts += (sample.total - self.avg_watts) / self.ticks as f64;

        let dt = (sample.elapsed_secs - prev.elapsed_secs).max(0.0);
        self.energy_joules += (sample.total + prev.total) / 2.0 * dt;

        // Strict comparisons: a tie keeps the earlier tick.
        if sample.total > self.max_watts {
            self.max_watts = sample.total;
            self.peak_at_secs = sample.elapsed_secs;
            self.top_rail_at_peak = sample.top_rail().map(|(rail, _)| rail.to_string());
        }
        if sample.total < self.min_watts {
            self.min_watts = sample.total;
            self.min_at_secs = sample.elapsed_secs;
        }
    }

    /// Recompute the snapshot from the history alone.
    ///
    /// Runs the exact fold the incremental path runs, so the result is
    /// bit-identical to the snapshot the aggregator maintains. Returns
    /// `None` for an empty history.
    pub fn compute(history: &History, interval: Duration) -> Option<Self> {
        let mut samples = history.samples().iter();
        let first = samples.next()?;
        let mut snapshot = Self::first(first, interval);
        let mut prev = first;
        for sample in samples {
            snapshot.absorb(prev, sample);
            prev = sample;
        }
        Some(snapshot)
    }
}

/// Folds each tick's readings into the history and the rolling snapshot.
///
/// A failed rail reading is recorded as missing for that tick and excluded
/// from the tick total (not zero-filled). A tick where every rail failed
/// still yields a sample, with total 0.0, so the history keeps one entry per
/// tick. Recording never fails.
pub struct Aggregator {
    interval: Duration,
    history: History,
    snapshot: Option<MetricsSnapshot>,
}

impl Aggregator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            history: History::new(),
            snapshot: None,
        }
    }

    /// Record one tick. `readings` carries one entry per tracked rail, in
    /// display order; errors become missing values.
    pub fn record(
        &mut self,
        elapsed_secs: f64,
        readings: Vec<(String, Result<Reading, SourceError>)>,
    ) -> &Sample {
        let rails: Vec<RailSample> = readings
            .into_iter()
            .map(|(rail, result)| match result {
                Ok(reading) => RailSample {
                    rail,
                    watts: Some(reading.watts),
                },
                Err(e) => {
                    log::debug!("rail {rail} missing this tick: {e}");
                    RailSample { rail, watts: None }
                }
            })
            .collect();

        let total = rails.iter().filter_map(|r| r.watts).sum();
        let sample = Sample {
            elapsed_secs,
            rails,
            total,
        };

        match (self.snapshot.take(), self.history.last()) {
            (Some(mut snapshot), Some(prev)) => {
                snapshot.absorb(prev, &sample);
                self.snapshot = Some(snapshot);
            }
            _ => self.snapshot = Some(MetricsSnapshot::first(&sample, self.interval)),
        }

        let idx = self.history.len();
        self.history.push(sample);
        &self.history.samples()[idx]
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The rolling snapshot; `None` until the first tick is recorded.
    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Feed one tick into the aggregator from a per-rail value list; `None`
    /// simulates a failed reading.
    fn tick(agg: &mut Aggregator, elapsed: f64, values: &[(&str, Option<f64>)]) {
        let readings = values
            .iter()
            .map(|(rail, watts)| {
                let result = match watts {
                    Some(w) => Ok(Reading::new(*rail, *w)),
                    None => Err(SourceError::Unavailable("scripted failure".into())),
                };
                (rail.to_string(), result)
            })
            .collect();
        agg.record(elapsed, readings);
    }

    #[test]
    fn three_tick_scenario() {
        // 1s cadence, three rails: totals 15, 10, 20.
        let mut agg = Aggregator::new(Duration::from_secs(1));
        tick(&mut agg, 1.0, &[("r1", Some(5.0)), ("r2", Some(5.0)), ("r3", Some(5.0))]);
        tick(&mut agg, 2.0, &[("r1", Some(10.0)), ("r2", Some(0.0)), ("r3", Some(0.0))]);
        tick(&mut agg, 3.0, &[("r1", Some(0.0)), ("r2", Some(0.0)), ("r3", Some(20.0))]);

        let m = agg.snapshot().unwrap();
        assert_eq!(m.ticks, 3);
        assert!((m.max_watts - 20.0).abs() < EPS);
        assert!((m.peak_at_secs - 3.0).abs() < EPS);
        assert!((m.min_watts - 10.0).abs() < EPS);
        assert!((m.min_at_secs - 2.0).abs() < EPS);
        assert!((m.avg_watts - 15.0).abs() < EPS);
        assert_eq!(m.top_rail_at_peak.as_deref(), Some("r3"));

        // 15*1 (first tick) + 12.5 + 15 (trapezoids)
        assert!((m.energy_joules - 42.5).abs() < EPS);
    }

    #[test]
    fn incremental_snapshot_matches_recompute_after_every_tick() {
        let mut agg = Aggregator::new(Duration::from_millis(500));
        let script: &[&[(&str, Option<f64>)]] = &[
            &[("core", Some(2.1)), ("ddr", Some(0.4))],
            &[("core", Some(2.3)), ("ddr", None)],
            &[("core", None), ("ddr", None)],
            &[("core", Some(1.9)), ("ddr", Some(0.5))],
            &[("core", Some(2.3)), ("ddr", Some(0.2))],
        ];

        for (i, values) in script.iter().enumerate() {
            tick(&mut agg, 0.5 * (i + 1) as f64, values);
            let recomputed = MetricsSnapshot::compute(agg.history(), agg.interval());
            assert_eq!(agg.snapshot(), recomputed.as_ref());
        }
    }

    #[test]
    fn average_matches_plain_mean() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        let totals = [3.25, 4.5, 0.75, 6.125, 5.0, 4.875];
        for (i, w) in totals.iter().enumerate() {
            tick(&mut agg, (i + 1) as f64, &[("core", Some(*w))]);
            let mean: f64 = totals[..=i].iter().sum::<f64>() / (i + 1) as f64;
            assert!((agg.snapshot().unwrap().avg_watts - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn extremes_bound_every_total_and_energy_grows() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        let totals = [4.0, 2.5, 7.25, 7.25, 0.5, 3.0];
        let mut last_energy = 0.0;
        for (i, w) in totals.iter().enumerate() {
            tick(&mut agg, (i + 1) as f64, &[("core", Some(*w))]);
            let m = agg.snapshot().unwrap();
            for s in agg.history().samples() {
                assert!(m.max_watts >= s.total);
                assert!(m.min_watts <= s.total);
            }
            assert!(m.energy_joules >= last_energy);
            last_energy = m.energy_joules;
        }
    }

    #[test]
    fn ties_keep_the_earlier_tick() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        tick(&mut agg, 1.0, &[("a", Some(5.0)), ("b", Some(1.0))]);
        tick(&mut agg, 2.0, &[("a", Some(1.0)), ("b", Some(5.0))]);

        let m = agg.snapshot().unwrap();
        assert!((m.peak_at_secs - 1.0).abs() < EPS);
        assert!((m.min_at_secs - 1.0).abs() < EPS);
        // The peak is still tick 1, so its top rail stands.
        assert_eq!(m.top_rail_at_peak.as_deref(), Some("a"));
    }

    #[test]
    fn missing_rail_is_excluded_not_zeroed() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        tick(&mut agg, 1.0, &[("a", Some(1.5)), ("b", None), ("c", Some(2.0))]);

        let sample = agg.history().last().unwrap();
        assert!((sample.total - 3.5).abs() < EPS);
        assert_eq!(sample.missing(), 1);
        assert_eq!(sample.rails[1].watts, None);
    }

    #[test]
    fn all_rails_failing_yields_degenerate_sample() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        tick(&mut agg, 1.0, &[("a", Some(2.0))]);
        tick(&mut agg, 2.0, &[("a", None)]);

        assert_eq!(agg.history().len(), 2);
        let sample = agg.history().last().unwrap();
        assert_eq!(sample.total, 0.0);
        assert_eq!(agg.snapshot().unwrap().min_watts, 0.0);
    }

    #[test]
    fn empty_history_has_no_snapshot() {
        let agg = Aggregator::new(Duration::from_secs(1));
        assert!(agg.snapshot().is_none());
        assert!(MetricsSnapshot::compute(agg.history(), agg.interval()).is_none());
    }

    #[test]
    fn energy_uses_elapsed_time_not_nominal_interval() {
        // Ticks arrive late: 1s cadence but 2s actually elapsed between them.
        let mut agg = Aggregator::new(Duration::from_secs(1));
        tick(&mut agg, 1.0, &[("a", Some(10.0))]);
        tick(&mut agg, 3.0, &[("a", Some(10.0))]);

        // 10*1 for the first tick, then 10W over 2 real seconds.
        let m = agg.snapshot().unwrap();
        assert!((m.energy_joules - 30.0).abs() < EPS);
    }
}
