//! Command implementations and the shared run plumbing.

pub mod monitor;
pub mod record;
pub mod scan;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use railwatch_core::{ExportError, MetricsSnapshot, Monitor, PowerSource, SourceError, chart};

/// Options shared by the sampling commands (`monitor`, `record`).
pub struct RunConfig {
    pub interval: Duration,
    pub output: PathBuf,
    pub rails_filter: Option<String>,
    pub duration: Option<Duration>,
    pub summary: Option<PathBuf>,
}

impl RunConfig {
    /// Validate raw CLI arguments into a config.
    pub fn build(
        interval: f64,
        output: String,
        rails: Option<String>,
        duration: Option<String>,
        summary: Option<String>,
    ) -> Result<Self, String> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(format!("interval must be positive, got {interval}"));
        }
        let duration = duration.as_deref().map(parse_duration).transpose()?;

        Ok(Self {
            interval: Duration::from_secs_f64(interval),
            output: PathBuf::from(output),
            rails_filter: rails,
            duration,
            summary: summary.map(PathBuf::from),
        })
    }
}

/// Parse a duration string like "5m", "30s", "1h", "100ms". A bare number
/// means seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    numeric
        .parse::<u64>()
        .map(|v| Duration::from_millis(v * multiplier))
        .map_err(|_| format!("invalid duration '{s}'"))
}

/// Discover the rails a source reports and apply the user's filter.
pub fn resolve_rails(
    source: &dyn PowerSource,
    filter: Option<&str>,
) -> Result<Vec<String>, SourceError> {
    let all = source.detect_rails()?;
    Ok(filter_rails(all, filter))
}

/// Comma-separated, case-insensitive substring filter. An empty match falls
/// back to every rail rather than monitoring nothing.
fn filter_rails(all: Vec<String>, filter: Option<&str>) -> Vec<String> {
    let Some(filter) = filter else { return all };

    let patterns: Vec<String> = filter
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return all;
    }

    let picked: Vec<String> = all
        .iter()
        .filter(|rail| {
            let rail = rail.to_lowercase();
            patterns.iter().any(|p| rail.contains(p))
        })
        .cloned()
        .collect();

    if picked.is_empty() {
        eprintln!("Warning: no rails matched filter '{filter}', monitoring all");
        return all;
    }
    picked
}

/// Shutdown path shared by the sampling commands: export the chart exactly
/// once, write the optional JSON summary, report what happened. Returns the
/// process exit code.
///
/// Stopping before the first tick is a clean exit (code 0): there is simply
/// nothing to chart, and the user is told so. A chart or summary write
/// failure is reported and exits 1.
pub fn finish_run(monitor: &Monitor, cfg: &RunConfig) -> i32 {
    let mut code = 0;

    let outcome = match monitor.snapshot() {
        Some(snapshot) => chart::export(monitor.history(), snapshot, &cfg.output),
        None => Err(ExportError::EmptyHistory),
    };
    match outcome {
        Ok(()) => println!("Chart exported to {}", cfg.output.display()),
        Err(e @ ExportError::EmptyHistory) => println!("{e}"),
        Err(e) => {
            eprintln!("Error: {e}");
            code = 1;
        }
    }

    if let Some(path) = &cfg.summary {
        match write_summary(monitor, path) {
            Ok(true) => println!("Summary written to {}", path.display()),
            Ok(false) => {}
            Err(e) => {
                eprintln!("Error writing summary: {e}");
                code = 1;
            }
        }
    }

    code
}

#[derive(Serialize)]
struct RunSummary<'a> {
    version: &'static str,
    source: &'a str,
    interval_secs: f64,
    ticks: usize,
    rails: &'a [String],
    metrics: &'a MetricsSnapshot,
}

/// Write the run's summary statistics as pretty JSON. Returns false when no
/// sample was ever recorded (nothing worth writing).
fn write_summary(monitor: &Monitor, path: &Path) -> io::Result<bool> {
    let Some(metrics) = monitor.snapshot() else {
        return Ok(false);
    };

    let summary = RunSummary {
        version: railwatch_core::VERSION,
        source: monitor.source_name(),
        interval_secs: monitor.interval().as_secs_f64(),
        ticks: monitor.history().len(),
        rails: monitor.rails(),
        metrics,
    };

    let json = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
    std::fs::write(path, json)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use railwatch_core::MockPowerSource;

    // -----------------------------------------------------------------------
    // parse_duration
    // -----------------------------------------------------------------------

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn parse_duration_bare_number_is_seconds() {
        assert_eq!(parse_duration("42").unwrap(), Duration::from_secs(42));
        assert_eq!(parse_duration(" 42 ").unwrap(), Duration::from_secs(42));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("1.5s").is_err());
    }

    // -----------------------------------------------------------------------
    // RunConfig
    // -----------------------------------------------------------------------

    #[test]
    fn build_config_rejects_bad_interval() {
        assert!(RunConfig::build(0.0, "out.svg".into(), None, None, None).is_err());
        assert!(RunConfig::build(-1.0, "out.svg".into(), None, None, None).is_err());
        assert!(RunConfig::build(f64::NAN, "out.svg".into(), None, None, None).is_err());
    }

    #[test]
    fn build_config_parses_duration() {
        let cfg =
            RunConfig::build(0.5, "out.svg".into(), None, Some("30s".into()), None).unwrap();
        assert_eq!(cfg.interval, Duration::from_millis(500));
        assert_eq!(cfg.duration, Some(Duration::from_secs(30)));
    }

    // -----------------------------------------------------------------------
    // rail filtering
    // -----------------------------------------------------------------------

    fn rails() -> Vec<String> {
        vec!["VDD_CORE".into(), "DDR_VDD2".into(), "DDR_VDDQ".into(), "HDMI".into()]
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let picked = filter_rails(rails(), Some("ddr"));
        assert_eq!(picked, vec!["DDR_VDD2".to_string(), "DDR_VDDQ".to_string()]);
    }

    #[test]
    fn filter_accepts_comma_separated_patterns() {
        let picked = filter_rails(rails(), Some("core, hdmi"));
        assert_eq!(picked, vec!["VDD_CORE".to_string(), "HDMI".to_string()]);
    }

    #[test]
    fn filter_with_no_match_falls_back_to_all() {
        let picked = filter_rails(rails(), Some("gpu"));
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert_eq!(filter_rails(rails(), None).len(), 4);
    }

    #[test]
    fn resolve_rails_uses_the_source() {
        let source = MockPowerSource::new(&["core", "ddr"]);
        let picked = resolve_rails(&source, Some("core")).unwrap();
        assert_eq!(picked, vec!["core".to_string()]);
    }

    // -----------------------------------------------------------------------
    // finish_run / write_summary
    // -----------------------------------------------------------------------

    fn finished_monitor(frames: Vec<Vec<Option<f64>>>) -> Monitor {
        let ticks = frames.len();
        let source = MockPowerSource::new(&["core", "ddr"]).with_frames(frames);
        let mut monitor = Monitor::new(
            Box::new(source),
            vec!["core".into(), "ddr".into()],
            Duration::from_millis(10),
        );
        monitor.start();
        for _ in 0..ticks {
            monitor.tick();
        }
        monitor.stop();
        monitor
    }

    #[test]
    fn finish_run_exports_chart_and_summary() {
        let monitor = finished_monitor(vec![
            vec![Some(2.0), Some(0.5)],
            vec![Some(2.2), Some(0.4)],
        ]);
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            interval: Duration::from_millis(10),
            output: dir.path().join("report.svg"),
            rails_filter: None,
            duration: None,
            summary: Some(dir.path().join("summary.json")),
        };

        assert_eq!(finish_run(&monitor, &cfg), 0);
        assert!(cfg.output.exists());

        let json = std::fs::read_to_string(cfg.summary.as_ref().unwrap()).unwrap();
        assert!(json.contains("\"ticks\": 2"));
        assert!(json.contains("max_watts"));
    }

    #[test]
    fn finish_run_with_empty_history_is_clean() {
        let source = MockPowerSource::new(&["core"]);
        let monitor = Monitor::new(Box::new(source), vec!["core".into()], Duration::from_secs(1));
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            interval: Duration::from_secs(1),
            output: dir.path().join("report.svg"),
            rails_filter: None,
            duration: None,
            summary: Some(dir.path().join("summary.json")),
        };

        // Stopped before the first tick: no chart, no summary, exit 0.
        assert_eq!(finish_run(&monitor, &cfg), 0);
        assert!(!cfg.output.exists());
        assert!(!cfg.summary.as_ref().unwrap().exists());
    }

    #[test]
    fn finish_run_reports_unwritable_output() {
        let monitor = finished_monitor(vec![vec![Some(2.0), Some(0.5)]]);
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            interval: Duration::from_millis(10),
            output: dir.path().join("no-such-dir").join("report.svg"),
            rails_filter: None,
            duration: None,
            summary: None,
        };

        assert_eq!(finish_run(&monitor, &cfg), 1);
    }
}
