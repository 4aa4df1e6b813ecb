//! # meter-types
//!
//! Core types for energy-metering snapshots. A metering device pushes its
//! readings into a hierarchical store laid out as
//!
//! ```text
//! energy_data/{year}/{month}/{day}/{recordKey} -> Record
//! ```
//!
//! and consumers receive the whole tree as an immutable [`EnergySnapshot`]
//! every time it changes. This crate defines that tree, the [`Record`] wire
//! format, and the [`Timestamp`] format the device writes.
//!
//! ## Decoding rules
//!
//! - Any level of the tree may arrive as a JSON object or as a JSON array
//!   (the array index becomes the key). `null` children are skipped.
//! - Numeric record fields accept any JSON number. Values of the wrong type
//!   are treated as absent instead of failing the snapshot.
//! - A document that wraps the tree in an `energy_data` key (a full database
//!   export) is unwrapped automatically.
//!
//! ## Example
//!
//! ```rust
//! use meter_types::{EnergySnapshot, Record};
//!
//! let snapshot = EnergySnapshot::builder()
//!     .record(2025, 5, 20, "r1", Record::at("2025-5-20 09:00").with_energy(80.0))
//!     .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_energy(92.5))
//!     .build();
//!
//! assert_eq!(snapshot.record_count(), 2);
//! assert!(snapshot.day(2025, 5, 21).is_some());
//! ```

mod children;
mod error;
mod period;
mod record;
mod snapshot;
mod timestamp;

pub use children::Children;
pub use error::{SnapshotError, TimestampError};
pub use period::YearMonth;
pub use record::Record;
pub use snapshot::{DayNode, EnergySnapshot, EnergySnapshotBuilder, MonthNode, YearNode};
pub use timestamp::Timestamp;

/// Name of the store node the snapshot tree hangs under.
pub const ROOT_KEY: &str = "energy_data";
