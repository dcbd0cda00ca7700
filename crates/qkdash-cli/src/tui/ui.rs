//! TUI rendering — one dashboard screen.
//!
//! ┌──────────────────────────────────────────────────┐
//! │  ⚛ qkdash    http://127.0.0.1:5000    ⟳          │
//! ├───────────────┬──────────────────────────────────┤
//! │  Results      │  Quantum Channel                 │
//! │  SECURE       │  A  |   /    |  /     |       B  │
//! │  QBER 2.4%    │       /   |      /  |            │
//! │  16 bits      │                                  │
//! ├──────┬────────┴─┬──────────┬─────────────────────┤
//! │ QBER │ Detection│ Key rate │ Classical vs Quantum│
//! ├──────┴──────────┴──────────┴─────────────────────┤
//! │  [ok] Simulation complete — SECURE, 16 bits      │
//! ├──────────────────────────────────────────────────┤
//! │  q quit  s simulate  t testbed  m pair  ...      │
//! └──────────────────────────────────────────────────┘

use qkdash_core::animator::{Basis, WAVE_AMPLITUDE};
use qkdash_core::charts::COMPARISON_CATEGORIES;
use qkdash_core::{Severity, SimulationResult, TestbedResult};
use ratatui::{prelude::*, widgets::*};

use super::app::{App, Snapshot};

pub fn draw(f: &mut Frame, app: &App) {
    let snap = app.snapshot();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // title
            Constraint::Min(10),    // results + channel
            Constraint::Length(9),  // charts
            Constraint::Length(4),  // notifications
            Constraint::Length(1),  // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app, &snap);
    draw_main(f, rows[1], &snap);
    draw_charts(f, rows[2], app, &snap);
    draw_notifications(f, rows[3], &snap);
    draw_keys(f, rows[4]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let spin = if snap.busy { " ⟳" } else { "" };
    let live = if app.is_live() { "  live" } else { "" };
    let preset = app
        .active_preset()
        .map(|p| format!("  preset: {}", p.name()))
        .unwrap_or_default();
    let session = snap
        .session
        .as_deref()
        .map(|t| format!("  mobile: {t}"))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" ⚛ qkdash ", Style::default().bold().fg(Color::Cyan)),
            Span::raw(format!(" {}", app.server())),
            Span::styled(preset, Style::default().fg(Color::Yellow)),
            Span::styled(live, Style::default().fg(Color::Green)),
            Span::styled(session, Style::default().fg(Color::Magenta)),
            Span::styled(format!("{spin} "), Style::default().fg(Color::DarkGray)),
        ]));

    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(30)])
        .split(area);

    draw_results(f, cols[0], snap);
    draw_channel(f, cols[1], snap);
}

fn draw_results(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let mut lines: Vec<Line> = Vec::new();

    match &snap.simulation {
        Some(result) => lines.extend(simulation_lines(result)),
        None => lines.push(Line::from(Span::styled(
            "No simulation yet — press 's'",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    lines.push(Line::raw(""));
    match &snap.testbed {
        Some(result) => lines.extend(testbed_lines(result, snap.history.len())),
        None => lines.push(Line::from(Span::styled(
            "No testbed probe yet — press 't'",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let block = Block::default().borders(Borders::ALL).title(" Results ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn simulation_lines(result: &SimulationResult) -> Vec<Line<'_>> {
    let indicator = if result.is_secure {
        Span::styled(" SECURE ", Style::default().bold().fg(Color::Black).bg(Color::Green))
    } else {
        Span::styled(" INSECURE ", Style::default().bold().fg(Color::White).bg(Color::Red))
    };

    let mut lines = vec![
        Line::from(vec![Span::raw("Simulation  "), indicator]),
        Line::raw(format!("  QBER:      {:.2}%", result.qber_percent())),
        Line::raw(format!("  Final key: {}", result.key_length_label())),
        Line::raw(format!("  Key rate:  {:.3}", result.key_generation_rate)),
    ];
    if !result.backend_used.is_empty() {
        lines.push(Line::raw(format!("  Backend:   {}", result.backend_used)));
    }
    if !result.final_key.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("  Key: "),
            Span::styled(
                result.final_key.clone(),
                Style::default().fg(Color::Green),
            ),
        ]));
    }
    lines
}

fn testbed_lines(result: &TestbedResult, history_len: usize) -> Vec<Line<'_>> {
    let m = &result.metrics;
    vec![
        Line::from(vec![
            Span::raw("Testbed  rating "),
            Span::styled(
                result.analysis.rating.label(),
                Style::default().bold().fg(Color::Yellow),
            ),
            Span::raw(format!(
                " ({}/100)",
                result.analysis.suitability_score
            )),
        ]),
        Line::raw(format!("  Device:    {}", result.device_info.backend)),
        Line::raw(format!("  QBER:      {:.2}%", m.qber * 100.0)),
        Line::raw(format!("  Detection: {:.1}%", m.detection_efficiency * 100.0)),
        Line::raw(format!("  Key rate:  {:.1} bits/s", m.secure_key_rate)),
        Line::raw(format!("  Fidelity:  {:.3}", m.fidelity)),
        Line::raw(format!("  History:   {history_len} probes")),
    ]
}

/// Render the photon transit panel. Alice sits on the left edge, Bob on the
/// right; each photon is a basis-angled glyph riding the transit wave.
fn draw_channel(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let playing = if snap.animation.is_playing { "▶" } else { "⏸" };
    let title = format!(
        " Quantum Channel  {}  frame {:>3}/{} ",
        playing, snap.animation.current_frame, snap.animation.total_frames
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 6 || inner.height < 3 {
        return;
    }
    let width = inner.width as usize;
    let height = inner.height as usize;
    let mid = height / 2;

    // (glyph, color) per cell, photons drawn over an empty grid.
    let mut grid: Vec<Vec<Option<(char, Color)>>> = vec![vec![None; width]; height];
    for photon in &snap.photons {
        let col = 1 + (photon.progress * (width.saturating_sub(3)) as f64) as usize;
        let rel = photon.offset / WAVE_AMPLITUDE;
        let row_span = mid.saturating_sub(1) as f64;
        let row = (mid as f64 - rel * row_span).round();
        let row = (row.max(0.0) as usize).min(height - 1);

        let glyph = match photon.basis {
            Basis::Rectilinear => '|',
            Basis::Diagonal => '/',
        };
        let color = if photon.bit == 1 { Color::Yellow } else { Color::Cyan };
        grid[row][col.min(width - 1)] = Some((glyph, color));
    }
    grid[mid][0] = Some(('A', Color::Green));
    grid[mid][width - 1] = Some(('B', Color::Green));

    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|cell| match cell {
                        Some((c, color)) => {
                            Span::styled(c.to_string(), Style::default().fg(color).bold())
                        }
                        None => Span::raw(" "),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_charts(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    draw_feed_chart(f, cols[0], "QBER %", "qber", &snap.qber, app, Color::Red);
    draw_feed_chart(
        f,
        cols[1],
        "Detection %",
        "detection_efficiency",
        &snap.detection,
        app,
        Color::Cyan,
    );
    draw_feed_chart(
        f,
        cols[2],
        "Key rate",
        "key_rate",
        &snap.key_rate,
        app,
        Color::Green,
    );
    draw_comparison(f, cols[3], app, snap);
}

fn draw_feed_chart(
    f: &mut Frame,
    area: Rect,
    title: &str,
    chart_name: &str,
    series: &(Vec<String>, Vec<f64>),
    app: &App,
    color: Color,
) {
    let (labels, values) = series;
    let border = if app.is_flashing(chart_name) {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {title} "));

    if values.len() < 2 {
        let hint = Paragraph::new(Span::styled(
            "waiting for data",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(hint, area);
        return;
    }

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if (hi - lo).abs() < 1e-9 {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.1;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let x_last = labels.last().cloned().unwrap_or_default();
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, (values.len() - 1) as f64])
                .labels(vec![
                    Span::raw(labels.first().cloned().unwrap_or_default()),
                    Span::raw(x_last),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([lo - pad, hi + pad])
                .labels(vec![
                    Span::raw(format!("{:.1}", lo - pad)),
                    Span::raw(format!("{:.1}", hi + pad)),
                ]),
        );

    f.render_widget(chart, area);
}

fn draw_comparison(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let border = if app.is_flashing("comparison") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(" Classical vs Quantum ");

    let Some(panel) = &snap.comparison else {
        let hint = Paragraph::new(Span::styled(
            "run a testbed probe",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:<12}{:>7}{:>13}{:>12}",
            "", COMPARISON_CATEGORIES[0], COMPARISON_CATEGORIES[1], COMPARISON_CATEGORIES[2]
        ),
        Style::default().fg(Color::DarkGray),
    ))];
    for (name, values) in &panel.series {
        let color = if name == "quantum" { Color::Cyan } else { Color::Yellow };
        lines.push(Line::from(vec![
            Span::styled(format!("{name:<12}"), Style::default().fg(color).bold()),
            Span::raw(format!(
                "{:>7.0}{:>13.0}{:>12.0}",
                values[0], values[1], values[2]
            )),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_notifications(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let lines: Vec<Line> = snap
        .notifications
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|n| {
            let color = match n.severity {
                Severity::Info => Color::Cyan,
                Severity::Success => Color::Green,
                Severity::Warning => Color::Yellow,
                Severity::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", n.severity.label()), Style::default().fg(color)),
                Span::raw(n.message.clone()),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Messages ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let keys = " q quit   s simulate   t testbed   m pair   e export   p preset   l live   space play/pause   r reset   d dismiss";
    f.render_widget(
        Paragraph::new(Span::styled(keys, Style::default().fg(Color::DarkGray))),
        area,
    );
}
