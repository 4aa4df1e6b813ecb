//! # energy-dashboard
//!
//! A terminal dashboard and library for hierarchical energy-metering data.
//!
//! A metering device appends readings to a store laid out as
//! `energy_data/{year}/{month}/{day}/{recordKey}`. Every time the store
//! changes, this crate receives a complete snapshot of the tree, picks the
//! latest reading of each month, and shows this month's and last month's
//! energy, today's live voltage/current/frequency, and a yearly trend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(aggregate)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | StreamSource | ChannelSource  │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, clock, trend-year navigation and view switching
//! - **[`source`]**: Snapshot delivery ([`DataSource`] trait yielding [`StoreEvent`]s)
//!   from file polling, TCP streams, or in-process channels
//! - **[`data`]**: Latest-reading aggregation and the composed [`DashboardData`]
//! - **[`settings`]**: Layered configuration (TOML file, environment)
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch an exported store file
//! energy-dashboard --file energy_data.json --rate 0.25
//!
//! # Receive snapshots over TCP (newline-delimited JSON)
//! energy-dashboard --connect localhost:9090
//!
//! # Aggregate once and write JSON
//! energy-dashboard --file energy_data.json --export summary.json
//! ```
//!
//! ### Aggregating a snapshot directly
//!
//! ```
//! use chrono::NaiveDate;
//! use energy_dashboard::{DashboardData, DashboardOptions};
//! use meter_types::{EnergySnapshot, Record};
//!
//! let snapshot = EnergySnapshot::builder()
//!     .record(2025, 5, 20, "r1", Record::at("2025-5-20 09:00").with_energy(80.0))
//!     .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_energy(92.5))
//!     .build();
//!
//! let today = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
//! let data = DashboardData::from_snapshot(&snapshot, today, 2025, &DashboardOptions::default());
//! assert_eq!(data.current_month.kwh, 92.5);
//! assert_eq!(data.trend.points.len(), 12);
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use chrono::Local;
//! use energy_dashboard::{App, ChannelSource, DashboardOptions, StoreEvent};
//! use meter_types::EnergySnapshot;
//!
//! let (tx, source) = ChannelSource::create("firebase://meter");
//! let mut app = App::new(
//!     Box::new(source),
//!     DashboardOptions::default(),
//!     Local::now().naive_local(),
//!     None,
//! );
//!
//! tx.send(StoreEvent::Changed(EnergySnapshot::new())).unwrap();
//! assert!(app.reload_data());
//! ```
//!
//! ### Bridging from another transport
//!
//! ```no_run
//! use energy_dashboard::StreamSource;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
//! let source = StreamSource::from_bytes_channel(rx, "relay");
//! tx.send(br#"{"2025": {}}"#.to_vec()).await.unwrap();
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{DashboardData, DashboardOptions, HealthStatus, Limits, Metrics, Tariff, TrendSeries};
pub use settings::Settings;
pub use source::{ChannelSource, DataSource, FileSource, StoreEvent, StreamSource};
