//! Trend view rendering.
//!
//! Shows the twelve monthly totals of one calendar year as a bar chart,
//! next to a table with the exact values and costs.

use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Row, Table},
    Frame,
};

use meter_types::YearMonth;

use crate::app::App;
use crate::data::dashboard::{format_cost, format_kwh};
use crate::data::TrendSeries;
use crate::ui::Theme;

/// Build the monthly bar chart for a trend series.
///
/// Bars hold tenths of a kWh so small totals still get a visible height.
/// The month containing `highlight` is drawn in the theme's current-month colour.
pub fn bar_chart<'a>(
    trend: &TrendSeries,
    highlight: Option<YearMonth>,
    theme: &Theme,
    bar_width: u16,
    show_values: bool,
) -> BarChart<'a> {
    let bars: Vec<Bar> = trend
        .points
        .iter()
        .map(|point| {
            let period = YearMonth::new(trend.year, point.month);
            let text = if show_values && point.kwh > 0.0 {
                format!("{:.0}", point.kwh)
            } else {
                String::new()
            };

            Bar::default()
                .value(tenths(point.kwh))
                .label(Line::from(period.label()))
                .text_value(text)
                .style(theme.bar_style(Some(period) == highlight))
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(tenths(trend.max_kwh()).max(1))
}

fn tenths(kwh: f64) -> u64 {
    (kwh.max(0.0) * 10.0).round() as u64
}

/// Render the Trend view for the year selected in the app.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let trend = &data.trend;

    let [chart_area, table_area] =
        Layout::horizontal([Constraint::Fill(3), Constraint::Length(34)]).areas(area);

    let title = if trend.year == app.today.year() {
        format!(" Monthly energy {} ", trend.year)
    } else {
        format!(" Monthly energy {} (t: back to {}) ", trend.year, app.today.year())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    // 12 bars with a gap of 1 must fit inside the borders
    let bar_width = (chart_area.width.saturating_sub(2 + 11) / 12).clamp(1, 9);
    let chart = bar_chart(
        trend,
        Some(data.current_month.period),
        &app.theme,
        bar_width,
        bar_width >= 4,
    )
    .block(block);
    frame.render_widget(chart, chart_area);

    let tariff = app.options.tariff.as_ref();
    let rows: Vec<Row> = trend
        .labelled()
        .zip(trend.points.iter())
        .map(|((label, kwh), point)| {
            let period = YearMonth::new(trend.year, point.month);
            let style = if period == data.current_month.period {
                Style::default().fg(app.theme.highlight)
            } else if kwh == 0.0 {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            let cost = tariff
                .map(|t| format_cost(t.cost(kwh), &t.currency))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(label),
                Cell::from(format_kwh(kwh)),
                Cell::from(cost),
            ])
            .style(style)
        })
        .collect();

    let total = trend.total_kwh();
    let total_cost = tariff
        .map(|t| format_cost(t.cost(total), &t.currency))
        .unwrap_or_else(|| "-".to_string());
    let footer = Row::new(vec![
        Cell::from("Total"),
        Cell::from(format_kwh(total)),
        Cell::from(total_cost),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let header = Row::new(vec!["Month", "Energy", "Cost"])
        .height(1)
        .style(app.theme.header);

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .footer(footer)
    .block(
        Block::default()
            .title(" By month ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, table_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenths() {
        assert_eq!(tenths(92.5), 925);
        assert_eq!(tenths(0.04), 0);
        assert_eq!(tenths(-3.0), 0);
    }
}
