//! Post-run chart export.
//!
//! Renders the recorded history as an SVG line chart: a heavy series for the
//! total draw, a light series per rail, and the run's summary statistics as
//! a text block on the figure. Runs once, after the loop has stopped, so its
//! cost never touches the sampling cadence. Output is deterministic: the
//! same history renders to byte-identical SVG.

use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::error::ExportError;
use crate::history::History;
use crate::metrics::MetricsSnapshot;

/// Output size in pixels.
const CHART_SIZE: (u32, u32) = (1200, 800);

const TOTAL_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Per-rail series colors, cycled when the PMIC reports more rails.
const RAIL_COLORS: [RGBColor; 8] = [
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(255, 127, 14),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(23, 190, 207),
];

/// Render the run to an SVG file at `path`.
///
/// Fails with [`ExportError::EmptyHistory`] when nothing was recorded (the
/// run was stopped before the first tick) and [`ExportError::Io`] when the
/// path cannot be written. Rendering happens in memory first, so a backend
/// failure never leaves a half-written file behind.
pub fn export(
    history: &History,
    snapshot: &MetricsSnapshot,
    path: &Path,
) -> Result<(), ExportError> {
    if history.is_empty() {
        return Err(ExportError::EmptyHistory);
    }

    let mut svg = String::new();
    render(history, snapshot, &mut svg)?;
    fs::write(path, svg.as_bytes())?;
    Ok(())
}

fn render(
    history: &History,
    snapshot: &MetricsSnapshot,
    out: &mut String,
) -> Result<(), ExportError> {
    let samples = history.samples();
    let x_max = samples
        .last()
        .map(|s| s.elapsed_secs)
        .unwrap_or(0.0)
        .max(1.0);
    let y_max = (snapshot.max_watts * 1.15).max(0.1);

    let root = SVGBackend::with_string(out, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Power draw over time", ("sans-serif", 28))
        .margin(24)
        .x_label_area_size(44)
        .y_label_area_size(64)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Elapsed (s)")
        .y_desc("Power (W)")
        .draw()
        .map_err(render_err)?;

    let total: Vec<(f64, f64)> = samples.iter().map(|s| (s.elapsed_secs, s.total)).collect();
    chart
        .draw_series(LineSeries::new(total, TOTAL_COLOR.stroke_width(3)))
        .map_err(render_err)?
        .label("total")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], TOTAL_COLOR.stroke_width(3)));

    // Rails are fixed for a run; take the order from the first sample.
    let rail_names: Vec<String> = samples[0].rails.iter().map(|r| r.rail.clone()).collect();
    for (i, rail) in rail_names.iter().enumerate() {
        let color = RAIL_COLORS[i % RAIL_COLORS.len()];
        // Missing ticks drop out of the series rather than plotting as zero.
        let series: Vec<(f64, f64)> = samples
            .iter()
            .filter_map(|s| {
                s.rails
                    .iter()
                    .find(|r| &r.rail == rail)
                    .and_then(|r| r.watts)
                    .map(|w| (s.elapsed_secs, w))
            })
            .collect();
        if series.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(series, &color))
            .map_err(render_err)?
            .label(rail.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    let style = ("sans-serif", 15).into_font().color(&BLACK);
    for (i, line) in summary_lines(snapshot).iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (80, 70 + 20 * i as i32),
            style.clone(),
        ))
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// The summary statistics block drawn onto the figure.
fn summary_lines(snapshot: &MetricsSnapshot) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Minimum power: {:.3} W (t={:.1}s)",
            snapshot.min_watts, snapshot.min_at_secs
        ),
        format!(
            "Maximum power: {:.3} W (t={:.1}s)",
            snapshot.max_watts, snapshot.peak_at_secs
        ),
        format!("Average power: {:.3} W", snapshot.avg_watts),
        format!("Total energy: {:.3} J", snapshot.energy_joules),
        format!("Samples: {}", snapshot.ticks),
    ];
    if let Some(rail) = &snapshot.top_rail_at_peak {
        lines.push(format!("Top rail at peak: {rail}"));
    }
    lines
}

fn render_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Render(e.to_string())
}
