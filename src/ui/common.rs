//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::dashboard::format_kwh;
use crate::data::duration::format_duration;

const TITLE: &str = "ENERGY MONITOR";

/// Render the header bar: overall metric health, title, date and clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let clock = vec![
        Span::raw("│ "),
        Span::raw(app.date_text()),
        Span::raw(" │ "),
        Span::styled(
            app.clock_text.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];

    let Some(ref data) = app.data else {
        let mut spans = vec![Span::styled(
            format!(" {} ", TITLE),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        spans.extend(clock);
        spans.push(Span::raw(" │ Loading..."));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    };

    let status = match data.metric_health.worst() {
        Some(health) => Span::styled(" ● ", app.theme.status_style(health)),
        None => Span::styled(" ○ ", Style::default().add_modifier(Modifier::DIM)),
    };

    let mut spans = vec![
        status,
        Span::styled(
            format!("{} ", TITLE),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    spans.extend(clock);
    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format_kwh(data.current_month.kwh),
        Style::default().fg(app.theme.highlight),
    ));
    spans.push(Span::raw(format!(" in {}", data.current_month.period)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Overview "), Line::from(" 2:Trend ")];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Trend => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, the last reading, time since the last update and the
/// controls. Temporary status messages and source errors take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let controls = match app.current_view {
            View::Overview => "Tab:switch r:reload e:export ?:help q:quit",
            View::Trend => "[/]:year t:this year Tab:switch ?:help q:quit",
        };
        let last_reading = data
            .last_reading
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| "none".to_string());
        let error = app
            .load_error
            .as_deref()
            .map(|e| format!(" | Error: {}", e))
            .unwrap_or_default();

        format!(
            " {} | Last reading {} | Updated {} ago{} | {}",
            app.source_description(),
            last_reading,
            format_duration(data.last_updated.elapsed()),
            error,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        format!(" Waiting for {} | q:quit", app.source_description())
    };

    let style = if app.load_error.is_some() {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Views"),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  1 / 2       Overview / Trend"),
        Line::from(""),
        section(" Trend"),
        Line::from("  [ / ]       Previous / next year"),
        Line::from("  t           Back to this year"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Reload data"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
