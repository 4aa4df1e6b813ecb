//! Overview view rendering.
//!
//! Displays this month's and last month's totals (with costs when a tariff
//! is configured), today's live metrics coloured by health, and a compact
//! trend chart.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::dashboard::{format_cost, format_kwh, format_metric};
use crate::data::{HealthStatus, MonthTotal};
use crate::ui::trend::bar_chart;

/// Render the Overview view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let message = match app.load_error {
            Some(ref err) => format!("No data yet: {}", err),
            None => format!("Waiting for {}...", app.source_description()),
        };
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(panel(app, " Energy "));
        frame.render_widget(paragraph, area);
        return;
    };

    let [totals_area, metrics_area, chart_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(6),
    ])
    .areas(area);

    let [current_area, previous_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(totals_area);
    render_month(frame, app, &data.current_month, " This month ", current_area);
    render_month(frame, app, &data.previous_month, " Last month ", previous_area);

    let metrics = data.metrics.unwrap_or_default();
    let health = data.metric_health;
    let [voltage_area, current_area, frequency_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(metrics_area);
    render_metric(
        frame,
        app,
        " Voltage ",
        format_metric(metrics.voltage, "V"),
        health.voltage,
        voltage_area,
    );
    render_metric(
        frame,
        app,
        " Current ",
        format_metric(metrics.current, "A"),
        health.current,
        current_area,
    );
    render_metric(
        frame,
        app,
        " Frequency ",
        format_metric(metrics.frequency, "Hz"),
        health.frequency,
        frequency_area,
    );

    let title = format!(" Trend {} ", data.trend.year);
    let bar_width = (chart_area.width.saturating_sub(2 + 11) / 12).clamp(1, 5);
    let chart = bar_chart(
        &data.trend,
        Some(data.current_month.period),
        &app.theme,
        bar_width,
        false,
    )
    .block(panel(app, &title));
    frame.render_widget(chart, chart_area);
}

fn panel<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_month(frame: &mut Frame, app: &App, total: &MonthTotal, title: &str, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            format_kwh(total.kwh),
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            total.period.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    if let (Some(cost), Some(currency)) = (total.cost, app.currency()) {
        lines.push(Line::from(format_cost(cost, currency)));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(app, title));
    frame.render_widget(paragraph, area);
}

fn render_metric(
    frame: &mut Frame,
    app: &App,
    title: &str,
    value: String,
    health: Option<HealthStatus>,
    area: Rect,
) {
    let label = health.map_or("no reading", |status| status.symbol());

    let lines = vec![
        Line::from(Span::styled(value, app.theme.metric_style(health))),
        Line::from(Span::styled(
            label,
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(app, title));
    frame.render_widget(paragraph, area);
}
