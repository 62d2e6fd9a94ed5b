//! Append-only run history.

use crate::reading::Sample;

/// The ordered sequence of samples for one run, one entry per tick.
///
/// Owned exclusively by the aggregator; renderers and the exporter only ever
/// see the read-only slice from [`History::samples`]. Samples are appended
/// and never mutated in place. The history grows for the whole run; a run
/// is bounded by the user, not by the monitor.
#[derive(Debug, Default)]
pub struct History {
    samples: Vec<Sample>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Read-only view of every recorded sample, in tick order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}
