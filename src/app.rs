//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use meter_types::EnergySnapshot;

use crate::data::{DashboardData, DashboardOptions};
use crate::source::{DataSource, StoreEvent};
use crate::ui::Theme;

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Month totals, live metrics and a compact trend.
    Overview,
    /// Full-year trend chart and per-month table.
    Trend,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Trend,
            View::Trend => View::Overview,
        }
    }

    /// Cycle to the previous view. With two views this is the same as `next`.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Trend => "Trend",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    /// Latest snapshot delivered by the store, kept so the dashboard can be
    /// recomputed when the date or the trend year changes.
    snapshot: Option<EnergySnapshot>,
    pub data: Option<DashboardData>,
    pub load_error: Option<String>,
    pub options: DashboardOptions,

    // Calendar
    pub today: NaiveDate,
    date_pinned: bool,
    trend_year_override: Option<i32>,
    pub clock_text: String,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App.
    ///
    /// `now` is the local wall-clock time. When `pinned_date` is set the
    /// dashboard always reports that day and ignores day rollovers.
    pub fn new(
        source: Box<dyn DataSource>,
        options: DashboardOptions,
        now: NaiveDateTime,
        pinned_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            source,
            snapshot: None,
            data: None,
            load_error: None,
            options,
            today: pinned_date.unwrap_or_else(|| now.date()),
            date_pinned: pinned_date.is_some(),
            trend_year_override: None,
            clock_text: format_clock(now),
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Header date, e.g. "2025-05-21, Wednesday".
    pub fn date_text(&self) -> String {
        self.today.format("%Y-%m-%d, %A").to_string()
    }

    /// Currency configured with the tariff, if any.
    pub fn currency(&self) -> Option<&str> {
        self.options.tariff.as_ref().map(|t| t.currency.as_str())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Drain pending events from the data source.
    ///
    /// Returns true if the dashboard was recomputed. A failure keeps the
    /// previously displayed values and is only logged and shown.
    pub fn reload_data(&mut self) -> bool {
        let mut updated = false;

        while let Some(event) = self.source.poll() {
            match event {
                StoreEvent::Changed(snapshot) => {
                    debug!(
                        records = snapshot.record_count(),
                        "Received snapshot from {}",
                        self.source.description()
                    );
                    self.snapshot = Some(snapshot);
                    self.load_error = None;
                    self.recompute();
                    updated = true;
                }
                StoreEvent::Failed(error) => {
                    warn!(source = %self.source.description(), "Snapshot update failed: {}", error);
                    self.load_error = Some(error);
                }
            }
        }

        updated
    }

    /// Ask the source to redeliver its state, then reload.
    pub fn force_reload(&mut self) {
        self.source.refresh();
        if self.reload_data() {
            self.set_status_message("Reloaded".to_string());
        }
    }

    /// Advance the wall clock. Recomputes the dashboard when the day changed.
    ///
    /// Returns true if the day rolled over.
    pub fn tick_clock(&mut self, now: NaiveDateTime) -> bool {
        self.clock_text = format_clock(now);

        if self.date_pinned || now.date() == self.today {
            return false;
        }

        info!("Day rolled over from {} to {}", self.today, now.date());
        self.today = now.date();
        self.recompute();
        true
    }

    /// Calendar year shown by the trend chart.
    pub fn trend_year(&self) -> i32 {
        self.trend_year_override.unwrap_or(self.today.year())
    }

    /// Show the previous year in the trend chart.
    pub fn prev_trend_year(&mut self) {
        self.set_trend_year(self.trend_year() - 1);
    }

    /// Show the next year in the trend chart.
    pub fn next_trend_year(&mut self) {
        self.set_trend_year(self.trend_year() + 1);
    }

    /// Return the trend chart to the current year.
    pub fn reset_trend_year(&mut self) {
        if self.trend_year_override.take().is_some() {
            self.recompute();
        }
    }

    fn set_trend_year(&mut self, year: i32) {
        self.trend_year_override = (year != self.today.year()).then_some(year);
        self.recompute();
    }

    fn recompute(&mut self) {
        if let Some(ref snapshot) = self.snapshot {
            self.data = Some(DashboardData::from_snapshot(
                snapshot,
                self.today,
                self.trend_year(),
                &self.options,
            ));
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current dashboard values to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(&data.export(self.currency()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// 12-hour clock text, e.g. "09:05 AM".
fn format_clock(now: NaiveDateTime) -> String {
    now.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tariff;
    use crate::source::ChannelSource;
    use meter_types::Record;
    use tokio::sync::watch;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn snapshot() -> EnergySnapshot {
        EnergySnapshot::builder()
            .record(2025, 4, 30, "r1", Record::at("2025-4-30 23:50").with_energy(310.0))
            .record(
                2025,
                5,
                21,
                "r1",
                Record::at("2025-5-21 11:45")
                    .with_energy(92.5)
                    .with_voltage(229.8)
                    .with_current(4.2)
                    .with_frequency(50.0),
            )
            .record(2025, 5, 22, "r1", Record::at("2025-5-22 00:10").with_energy(93.1))
            .record(2024, 12, 31, "r1", Record::at("2024-12-31 23:00").with_energy(280.0))
            .build()
    }

    fn app_with(
        now: NaiveDateTime,
        pinned: Option<NaiveDate>,
    ) -> (watch::Sender<StoreEvent>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(StoreEvent::Changed(snapshot())).unwrap();
        let app = App::new(Box::new(source), DashboardOptions::default(), now, pinned);
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Overview.next(), View::Trend);
        assert_eq!(View::Trend.next(), View::Overview);
        assert_eq!(View::Overview.prev(), View::Trend);
        assert_eq!(View::Trend.label(), "Trend");
    }

    #[test]
    fn test_reload_computes_dashboard() {
        let (_tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        assert!(app.data.is_none());

        assert!(app.reload_data());
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.current_month.kwh, 93.1);
        assert_eq!(data.previous_month.kwh, 310.0);
        assert_eq!(data.metrics.unwrap().voltage, Some(229.8));

        // Nothing new
        assert!(!app.reload_data());
    }

    #[test]
    fn test_failure_keeps_previous_values() {
        let (tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        app.reload_data();

        tx.send(StoreEvent::Failed("Permission denied".to_string()))
            .unwrap();
        assert!(!app.reload_data());

        assert_eq!(app.load_error.as_deref(), Some("Permission denied"));
        assert_eq!(app.data.as_ref().unwrap().current_month.kwh, 93.1);
    }

    #[test]
    fn test_new_snapshot_clears_error() {
        let (tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        app.reload_data();
        tx.send(StoreEvent::Failed("timeout".to_string())).unwrap();
        app.reload_data();

        tx.send(StoreEvent::Changed(EnergySnapshot::new())).unwrap();
        assert!(app.reload_data());
        assert!(app.load_error.is_none());
        assert_eq!(app.data.as_ref().unwrap().current_month.kwh, 0.0);
    }

    #[test]
    fn test_clock_text() {
        let (_tx, mut app) = app_with(at("2025-05-21", "09:05"), None);
        assert_eq!(app.clock_text, "09:05 AM");
        assert_eq!(app.date_text(), "2025-05-21, Wednesday");

        app.tick_clock(at("2025-05-21", "13:30"));
        assert_eq!(app.clock_text, "01:30 PM");
    }

    #[test]
    fn test_day_rollover_recomputes() {
        let (_tx, mut app) = app_with(at("2025-05-21", "23:59"), None);
        app.reload_data();
        assert!(app.data.as_ref().unwrap().metrics.is_some());

        assert!(!app.tick_clock(at("2025-05-21", "23:59")));
        assert!(app.tick_clock(at("2025-05-22", "00:00")));

        let data = app.data.as_ref().unwrap();
        assert_eq!(data.today, NaiveDate::from_ymd_opt(2025, 5, 22).unwrap());
        // Today's record carries energy but no live metrics
        assert_eq!(data.metrics.unwrap().voltage, None);
    }

    #[test]
    fn test_month_rollover_moves_previous_month() {
        let (_tx, mut app) = app_with(at("2025-05-31", "23:59"), None);
        app.reload_data();
        assert!(app.tick_clock(at("2025-06-01", "00:00")));

        let data = app.data.as_ref().unwrap();
        assert_eq!(data.current_month.kwh, 0.0);
        assert_eq!(data.previous_month.kwh, 93.1);
    }

    #[test]
    fn test_pinned_date_ignores_rollover() {
        let pinned = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (_tx, mut app) = app_with(at("2025-05-21", "23:59"), Some(pinned));
        app.reload_data();

        assert!(!app.tick_clock(at("2025-05-22", "00:00")));
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.today, pinned);
        assert_eq!(data.previous_month.kwh, 280.0);
    }

    #[test]
    fn test_trend_year_navigation() {
        let (_tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        app.reload_data();
        assert_eq!(app.trend_year(), 2025);

        app.prev_trend_year();
        assert_eq!(app.trend_year(), 2024);
        let trend = &app.data.as_ref().unwrap().trend;
        assert_eq!(trend.year, 2024);
        assert_eq!(trend.points[11].kwh, 280.0);
        // Month totals still follow today
        assert_eq!(app.data.as_ref().unwrap().current_month.kwh, 93.1);

        app.next_trend_year();
        app.next_trend_year();
        assert_eq!(app.trend_year(), 2026);

        app.reset_trend_year();
        assert_eq!(app.trend_year(), 2025);
        assert_eq!(app.data.as_ref().unwrap().trend.year, 2025);
    }

    #[test]
    fn test_force_reload_redelivers() {
        let (_tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        app.reload_data();
        app.force_reload();
        assert_eq!(app.get_status_message(), Some("Reloaded"));
    }

    #[test]
    fn test_export_state() {
        let (_tx, source) = ChannelSource::create("test");
        let options = DashboardOptions {
            tariff: Some(Tariff {
                rate_per_kwh: 0.2,
                currency: "€".to_string(),
            }),
            ..Default::default()
        };
        let mut app = App::new(Box::new(source), options, at("2025-05-21", "12:00"), None);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        // The channel starts with an empty snapshot
        app.reload_data();
        app.export_state(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["date"], "2025-05-21");
        assert_eq!(json["currency"], "€");
        assert_eq!(json["current_month"]["kwh"], 0.0);
        assert_eq!(json["trend"]["points"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_export_without_data_fails() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(
            Box::new(source),
            DashboardOptions::default(),
            at("2025-05-21", "12:00"),
            None,
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("x.json")).is_err());
    }

    #[test]
    fn test_status_message() {
        let (_tx, mut app) = app_with(at("2025-05-21", "12:00"), None);
        assert!(app.get_status_message().is_none());
        app.set_status_message("Exported".to_string());
        assert_eq!(app.get_status_message(), Some("Exported"));
    }
}
