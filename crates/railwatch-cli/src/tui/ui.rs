//! Dashboard rendering.
//!
//! ┌──────────────────────────────────────────────────┐
//! │  ⚡ railwatch   RUNNING   tick #42   every 1.0s  │
//! ├───────────────────────┬──────────────────────────┤
//! │  Summary              │  Rail draw (bars)        │
//! │  current 4.812 W      │  ▂ ▁ ▇ ▁ ▂ ▁             │
//! │  min / max / average  ├──────────────────────────┤
//! ├───────────────────────┤  total power             │
//! │  Rails (latest)       │  ⠉⠒⠤⠤⠒⠉ chart            │
//! ├───────────────────────┴──────────────────────────┤
//! │  q quit   p pause   +/- interval                 │
//! └──────────────────────────────────────────────────┘
//!
//! Layout constraints do the graceful degradation: on a small terminal the
//! panels clip instead of failing.

use ratatui::{prelude::*, widgets::*};

use railwatch_core::MonitorState;

use super::app::App;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // title
            Constraint::Min(10),    // main
            Constraint::Length(1),  // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_keys(f, rows[2]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let (state, state_color) = if app.paused() {
        ("PAUSED", Color::Yellow)
    } else {
        match app.monitor().state() {
            MonitorState::Running => ("RUNNING", Color::Green),
            MonitorState::Idle => ("IDLE", Color::DarkGray),
            MonitorState::Stopped => ("STOPPED", Color::Red),
        }
    };

    let ticks = app.monitor().history().len();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" ⚡ railwatch ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(state, Style::default().bold().fg(state_color)),
            Span::styled(
                format!(
                    "  tick #{ticks}  every {:.1}s  {:.0}s elapsed ",
                    app.interval().as_secs_f64(),
                    app.monitor().elapsed().as_secs_f64()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(44), Constraint::Percentage(56)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(cols[0]);
    draw_summary(f, left[0], app);
    draw_rail_table(f, left[1], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(cols[1]);
    draw_rail_bars(f, right[0], app);
    draw_total_chart(f, right[1], app);
}

fn draw_summary(f: &mut Frame, area: Rect, app: &App) {
    let text: Vec<Line> = match (app.latest(), app.monitor().snapshot()) {
        (Some(sample), Some(m)) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Current  ", Style::default().bold()),
                    Span::styled(
                        format!("{:.3} W", sample.total),
                        Style::default().bold().fg(Color::Yellow),
                    ),
                ]),
                Line::from(format!(
                    "Minimum  {:.3} W  at {:.1}s",
                    m.min_watts, m.min_at_secs
                )),
                Line::from(format!(
                    "Maximum  {:.3} W  at {:.1}s",
                    m.max_watts, m.peak_at_secs
                )),
                Line::from(format!("Average  {:.3} W", m.avg_watts)),
                Line::from(format!("Energy   {:.3} J", m.energy_joules)),
                Line::from(format!(
                    "Top rail at peak  {}",
                    m.top_rail_at_peak.as_deref().unwrap_or("—")
                )),
            ];
            if sample.missing() > 0 {
                lines.push(Line::from(Span::styled(
                    format!("{} rail(s) missing this tick", sample.missing()),
                    Style::default().fg(Color::Red),
                )));
            }
            lines
        }
        _ => vec![Line::from("Waiting for the first sample...")],
    };

    let p = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Summary "));
    f.render_widget(p, area);
}

fn draw_rail_table(f: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = match app.latest() {
        Some(sample) => sample
            .rails
            .iter()
            .map(|r| match r.watts {
                Some(w) => Row::new(vec![r.rail.clone(), format!("{w:.4} W")])
                    .style(Style::default().fg(Color::Green)),
                None => Row::new(vec![r.rail.clone(), "—".to_string()])
                    .style(Style::default().fg(Color::Red)),
            })
            .collect(),
        None => Vec::new(),
    };

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Length(12)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Rails (latest) "),
    );
    f.render_widget(table, area);
}

fn draw_rail_bars(f: &mut Frame, area: Rect, app: &App) {
    let Some(sample) = app.latest() else {
        f.render_widget(
            Block::default().borders(Borders::ALL).title(" Rail draw "),
            area,
        );
        return;
    };

    let bars: Vec<Bar> = sample
        .rails
        .iter()
        .map(|r| {
            let milliwatts = (r.watts.unwrap_or(0.0) * 1000.0).round() as u64;
            let style = match r.watts {
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default().fg(Color::Red),
            };
            Bar::default()
                .value(milliwatts)
                .label(Line::from(short_label(&r.rail)))
                .text_value(match r.watts {
                    Some(w) => format!("{w:.2}"),
                    None => "—".into(),
                })
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Rail draw (W, bar height in mW) "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(1);
    f.render_widget(chart, area);
}

fn draw_total_chart(f: &mut Frame, area: Rect, app: &App) {
    let data = app.total_window();
    if data.is_empty() {
        let p = Paragraph::new("collecting...")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Total power "));
        f.render_widget(p, area);
        return;
    }

    let latest = data.last().map(|(_, w)| *w).unwrap_or(0.0);
    let x_min = data.first().map(|(t, _)| *t).unwrap_or(0.0);
    let x_max = data.last().map(|(t, _)| *t).unwrap_or(0.0).max(x_min + 1.0);
    let y_max = app
        .monitor()
        .snapshot()
        .map(|m| m.max_watts * 1.15)
        .unwrap_or(1.0)
        .max(0.1);

    let datasets = vec![
        Dataset::default()
            .name(format!("{latest:.2} W"))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Total power  {latest:.2} W ")),
        )
        .x_axis(Axis::default().bounds([x_min, x_max]).labels(vec![
            Line::from(format!("{x_min:.0}s")),
            Line::from(format!("{x_max:.0}s")),
        ]))
        .y_axis(Axis::default().bounds([0.0, y_max]).labels(vec![
            Line::from("0"),
            Line::from(format!("{y_max:.1}")),
        ]));

    f.render_widget(chart, area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(" q: quit & export   p: pause   +/-: faster/slower sampling")
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

/// Rail names clipped to the bar width.
fn short_label(rail: &str) -> String {
    rail.chars().take(9).collect()
}
