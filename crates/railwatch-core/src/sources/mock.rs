//! Scripted in-memory source for tests and demos.

use std::sync::Mutex;

use crate::error::SourceError;
use crate::reading::Reading;
use crate::source::PowerSource;

/// Plays back a fixed per-tick script of rail values.
///
/// Each frame holds one value per rail; a `None` entry fails that rail for
/// the tick. `read_many` advances the script by one frame per call and the
/// last frame repeats once the script runs out, so a monitor can keep
/// ticking past the scripted range.
pub struct MockPowerSource {
    rails: Vec<String>,
    script: Mutex<Script>,
}

struct Script {
    frames: Vec<Vec<Option<f64>>>,
    cursor: usize,
}

impl MockPowerSource {
    pub fn new(rails: &[&str]) -> Self {
        Self {
            rails: rails.iter().map(|r| r.to_string()).collect(),
            script: Mutex::new(Script {
                frames: Vec::new(),
                cursor: 0,
            }),
        }
    }

    /// Replace the playback script. Frames are per-tick, values per rail in
    /// constructor order.
    pub fn with_frames(self, frames: Vec<Vec<Option<f64>>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.frames = frames;
            script.cursor = 0;
        }
        self
    }

    fn value_at(&self, frame_idx: usize, rail: &str) -> Result<f64, SourceError> {
        let idx = self
            .rails
            .iter()
            .position(|r| r == rail)
            .ok_or_else(|| SourceError::Unavailable(format!("unknown rail {rail}")))?;

        let script = self
            .script
            .lock()
            .map_err(|_| SourceError::Unavailable("script lock poisoned".into()))?;
        let frame = script
            .frames
            .get(frame_idx.min(script.frames.len().saturating_sub(1)))
            .ok_or_else(|| SourceError::Unavailable("no scripted frames".into()))?;

        frame
            .get(idx)
            .copied()
            .flatten()
            .ok_or_else(|| SourceError::Unavailable(format!("scripted failure for {rail}")))
    }

    fn cursor(&self) -> usize {
        self.script.lock().map(|s| s.cursor).unwrap_or(0)
    }

    fn advance(&self) {
        if let Ok(mut script) = self.script.lock() {
            if script.cursor + 1 < script.frames.len() {
                script.cursor += 1;
            }
        }
    }
}

impl PowerSource for MockPowerSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn detect_rails(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.rails.clone())
    }

    /// Reads from the current frame without advancing the script.
    fn read(&self, rail: &str) -> Result<Reading, SourceError> {
        let watts = self.value_at(self.cursor(), rail)?;
        Ok(Reading::new(rail, watts))
    }

    fn read_many(&self, rails: &[String]) -> Vec<(String, Result<Reading, SourceError>)> {
        let frame = self.cursor();
        let readings = rails
            .iter()
            .map(|rail| {
                let result = self
                    .value_at(frame, rail)
                    .map(|watts| Reading::new(rail.clone(), watts));
                (rail.clone(), result)
            })
            .collect();
        self.advance();
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_frames_in_order_then_repeats_the_last() {
        let src = MockPowerSource::new(&["a", "b"])
            .with_frames(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), None]]);
        let rails = src.detect_rails().unwrap();

        let first = src.read_many(&rails);
        assert!((first[0].1.as_ref().unwrap().watts - 1.0).abs() < 1e-9);
        assert!((first[1].1.as_ref().unwrap().watts - 2.0).abs() < 1e-9);

        let second = src.read_many(&rails);
        assert!((second[0].1.as_ref().unwrap().watts - 3.0).abs() < 1e-9);
        assert!(second[1].1.is_err());

        // Script exhausted: the last frame repeats.
        let third = src.read_many(&rails);
        assert!((third[0].1.as_ref().unwrap().watts - 3.0).abs() < 1e-9);
    }

    #[test]
    fn read_peeks_without_advancing() {
        let src = MockPowerSource::new(&["a"]).with_frames(vec![vec![Some(1.0)], vec![Some(2.0)]]);
        assert!((src.read("a").unwrap().watts - 1.0).abs() < 1e-9);
        assert!((src.read("a").unwrap().watts - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_rail_is_unavailable() {
        let src = MockPowerSource::new(&["a"]).with_frames(vec![vec![Some(1.0)]]);
        assert!(src.read("nope").is_err());
    }

    #[test]
    fn empty_script_fails_every_rail() {
        let src = MockPowerSource::new(&["a"]);
        let rails = src.detect_rails().unwrap();
        let readings = src.read_many(&rails);
        assert!(readings[0].1.is_err());
    }
}
