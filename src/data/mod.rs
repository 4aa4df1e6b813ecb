//! Data models and processing for energy snapshots.
//!
//! This module turns raw store snapshots into the values the dashboard
//! displays.
//!
//! ## Submodules
//!
//! - [`aggregate`]: Latest-reading queries ([`monthly_energy`], [`trend_series`], ...)
//! - [`dashboard`]: Composed dashboard values ([`DashboardData`]) with costs and metric health
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! EnergySnapshot (store push)
//!        │
//!        ▼
//! DashboardData::from_snapshot(snapshot, today, trend_year, options)
//!        │
//!        ├──▶ monthly_energy (this month, last month)
//!        ├──▶ instantaneous_metrics (today)
//!        └──▶ trend_series (12 months)
//! ```

pub mod aggregate;
pub mod dashboard;
pub mod duration;

pub use aggregate::{
    instantaneous_metrics, latest_day_in_month, latest_reading, latest_record_in_day,
    monthly_energy, trend_series, Metrics, TrendPoint, TrendSeries,
};
pub use dashboard::{
    Band, DashboardData, DashboardOptions, HealthStatus, Limits, MetricHealth, MonthTotal, Tariff,
};
