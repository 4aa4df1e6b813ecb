//! Dashboard values derived from one snapshot and one "today".
//!
//! This is where the aggregator's pure queries are combined into what the
//! display shows: this month, last month, today's live metrics, and the
//! yearly trend. Health colouring and tariff costs are layered on top.

use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use meter_types::{EnergySnapshot, Timestamp, YearMonth};

use super::aggregate::{
    instantaneous_metrics, latest_reading, monthly_energy, trend_series, Metrics, TrendSeries,
};

/// Health status for a live metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Normal,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// A tolerance band around a nominal value, as percentages of nominal.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Band {
    pub nominal: f64,
    /// Deviation (in percent of nominal) beyond which a reading is a warning.
    pub warning_pct: f64,
    /// Deviation (in percent of nominal) beyond which a reading is critical.
    pub critical_pct: f64,
}

impl Band {
    pub fn classify(&self, value: f64) -> HealthStatus {
        let deviation = if self.nominal == 0.0 {
            0.0
        } else {
            ((value - self.nominal) / self.nominal).abs() * 100.0
        };

        if deviation > self.critical_pct {
            HealthStatus::Critical
        } else if deviation > self.warning_pct {
            HealthStatus::Warning
        } else {
            HealthStatus::Normal
        }
    }
}

/// Limits used to colour the live metrics.
///
/// Defaults suit a 230 V / 50 Hz single-phase supply on a 40 A main fuse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub voltage: Band,
    pub frequency: Band,
    /// Current (A) above which the load is a warning.
    pub current_warning: f64,
    /// Current (A) above which the load is critical.
    pub current_critical: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            voltage: Band {
                nominal: 230.0,
                warning_pct: 6.0,
                critical_pct: 10.0,
            },
            frequency: Band {
                nominal: 50.0,
                warning_pct: 0.4,
                critical_pct: 1.0,
            },
            current_warning: 32.0,
            current_critical: 40.0,
        }
    }
}

impl Limits {
    fn classify_current(&self, amps: f64) -> HealthStatus {
        let load = amps.abs();
        if load > self.current_critical {
            HealthStatus::Critical
        } else if load > self.current_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Normal
        }
    }
}

/// Price per kWh used to turn energy totals into costs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tariff {
    pub rate_per_kwh: f64,
    /// Currency symbol or code shown next to costs (e.g. "€", "LKR").
    #[serde(default)]
    pub currency: String,
}

impl Tariff {
    pub fn cost(&self, kwh: f64) -> f64 {
        kwh * self.rate_per_kwh
    }
}

/// Options that shape the derived values but not the aggregation itself.
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub tariff: Option<Tariff>,
    pub limits: Limits,
}

/// Energy total of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub period: YearMonth,
    pub kwh: f64,
    /// `None` when no tariff is configured.
    pub cost: Option<f64>,
}

/// Health of each live metric; `None` where the metric itself is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricHealth {
    pub voltage: Option<HealthStatus>,
    pub current: Option<HealthStatus>,
    pub frequency: Option<HealthStatus>,
}

impl MetricHealth {
    /// The worst status among known metrics.
    pub fn worst(&self) -> Option<HealthStatus> {
        [self.voltage, self.current, self.frequency]
            .into_iter()
            .flatten()
            .max()
    }
}

/// Everything the dashboard displays, computed from one snapshot.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub today: NaiveDate,
    pub current_month: MonthTotal,
    pub previous_month: MonthTotal,
    /// Latest reading of today; `None` when today has no usable record.
    pub metrics: Option<Metrics>,
    pub metric_health: MetricHealth,
    /// Timestamp of the record the current-month total came from.
    pub last_reading: Option<Timestamp>,
    pub trend: TrendSeries,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Derive the dashboard for `today` from a snapshot.
    ///
    /// `trend_year` selects which calendar year the trend chart covers; the
    /// live view passes `today`'s year.
    pub fn from_snapshot(
        snapshot: &EnergySnapshot,
        today: NaiveDate,
        trend_year: i32,
        options: &DashboardOptions,
    ) -> Self {
        let this_month = YearMonth::from_date(today);
        let last_month = this_month.previous();

        let current_month = month_total(snapshot, this_month, options);
        let previous_month = month_total(snapshot, last_month, options);

        let metrics =
            instantaneous_metrics(snapshot, this_month.year, this_month.month, today.day());
        let metric_health = metrics
            .map(|m| MetricHealth {
                voltage: m.voltage.map(|v| options.limits.voltage.classify(v)),
                current: m.current.map(|a| options.limits.classify_current(a)),
                frequency: m.frequency.map(|f| options.limits.frequency.classify(f)),
            })
            .unwrap_or_default();

        let last_reading = latest_reading(snapshot, this_month.year, this_month.month)
            .and_then(|record| record.parsed_timestamp())
            .and_then(Result::ok);

        Self {
            today,
            current_month,
            previous_month,
            metrics,
            metric_health,
            last_reading,
            trend: trend_series(snapshot, trend_year),
            last_updated: Instant::now(),
        }
    }

    /// Build the JSON document written by the export command.
    pub fn export(&self, currency: Option<&str>) -> serde_json::Value {
        let month = |total: &MonthTotal| {
            serde_json::json!({
                "year": total.period.year,
                "month": total.period.month,
                "label": total.period.to_string(),
                "kwh": round1(total.kwh),
                "cost": total.cost.map(round2),
            })
        };

        let points: Vec<serde_json::Value> = self
            .trend
            .points
            .iter()
            .map(|p| {
                serde_json::json!({
                    "month": p.month,
                    "label": YearMonth::new(self.trend.year, p.month).label(),
                    "kwh": round1(p.kwh),
                })
            })
            .collect();

        serde_json::json!({
            "date": self.today.format("%Y-%m-%d").to_string(),
            "currency": currency,
            "current_month": month(&self.current_month),
            "previous_month": month(&self.previous_month),
            "metrics": self.metrics.map(|m| serde_json::json!({
                "voltage": m.voltage.map(round1),
                "current": m.current.map(round1),
                "frequency": m.frequency.map(round1),
            })),
            "last_reading": self.last_reading.map(|ts| ts.to_string()),
            "trend": {
                "year": self.trend.year,
                "total_kwh": round1(self.trend.total_kwh()),
                "points": points,
            },
        })
    }
}

fn month_total(
    snapshot: &EnergySnapshot,
    period: YearMonth,
    options: &DashboardOptions,
) -> MonthTotal {
    let kwh = monthly_energy(snapshot, period.year, period.month);
    MonthTotal {
        period,
        kwh,
        cost: options.tariff.as_ref().map(|t| t.cost(kwh)),
    }
}

/// Format an energy total with one decimal, e.g. `92.5 kWh`.
pub fn format_kwh(kwh: f64) -> String {
    format!("{:.1} kWh", kwh)
}

/// Format an optional metric with one decimal and its unit, or `--` when unknown.
pub fn format_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => format!("-- {}", unit),
    }
}

/// Format a cost with two decimals and the tariff's currency.
pub fn format_cost(cost: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{:.2}", cost)
    } else {
        format!("{} {:.2}", currency, cost)
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
