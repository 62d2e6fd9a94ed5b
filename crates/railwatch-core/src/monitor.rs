//! Monitor loop state machine.
//!
//! A [`Monitor`] owns the source, the tracked rail list, and the aggregate
//! state for one run. Drivers (the TUI dashboard, the headless record loop)
//! call [`tick`](Monitor::tick) at their own cadence and [`stop`](Monitor::stop)
//! it on interrupt; `&mut self` on `tick` keeps ticks strictly sequential,
//! so the history's append order follows wall-clock order.

use std::time::{Duration, Instant};

use crate::history::History;
use crate::metrics::{Aggregator, MetricsSnapshot};
use crate::reading::Sample;
use crate::source::PowerSource;

/// Lifecycle of a monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

pub struct Monitor {
    source: Box<dyn PowerSource>,
    rails: Vec<String>,
    aggregator: Aggregator,
    state: MonitorState,
    started: Option<Instant>,
}

impl Monitor {
    pub fn new(source: Box<dyn PowerSource>, rails: Vec<String>, interval: Duration) -> Self {
        Self {
            source,
            rails,
            aggregator: Aggregator::new(interval),
            state: MonitorState::Idle,
            started: None,
        }
    }

    /// Begin the run. Idle -> Running; records the start instant all sample
    /// timestamps are measured against. No-op in any other state.
    pub fn start(&mut self) {
        if self.state == MonitorState::Idle {
            self.state = MonitorState::Running;
            self.started = Some(Instant::now());
        }
    }

    /// Take one sample: read every tracked rail, fold the results into the
    /// aggregate state, return the recorded sample.
    ///
    /// The first tick starts the run implicitly. Per-rail failures are
    /// absorbed by the aggregator; ticking itself never fails.
    pub fn tick(&mut self) -> &Sample {
        self.start();
        let elapsed = self.elapsed().as_secs_f64();
        let readings = self.source.read_many(&self.rails);
        self.aggregator.record(elapsed, readings)
    }

    /// End the run. Running -> Stopped. No-op in any other state.
    pub fn stop(&mut self) {
        if self.state == MonitorState::Running {
            self.state = MonitorState::Stopped;
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Time since `start`, zero while idle.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn rails(&self) -> &[String] {
        &self.rails
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn interval(&self) -> Duration {
        self.aggregator.interval()
    }

    pub fn history(&self) -> &History {
        self.aggregator.history()
    }

    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.aggregator.snapshot()
    }
}
