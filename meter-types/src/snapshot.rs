//! Snapshot - a point-in-time copy of the metering store.

use serde::{Deserialize, Serialize};

use crate::{Children, Record, SnapshotError, ROOT_KEY};

/// Records of one day, keyed by opaque record key.
pub type DayNode = Children<Record>;
/// Days of one month, keyed by day number (`"1"`..`"31"`).
pub type MonthNode = Children<DayNode>;
/// Months of one year, keyed by month number (`"1"`..`"12"`).
pub type YearNode = Children<MonthNode>;

/// An immutable copy of the `energy_data` tree.
///
/// Every change notification from the store carries a complete snapshot;
/// consumers recompute everything from it and never diff two snapshots.
///
/// # Example
///
/// ```rust
/// use meter_types::EnergySnapshot;
///
/// let json = r#"{
///     "2025": { "5": { "21": {
///         "-Nx1": { "timestamp": "2025-5-21 11:45", "current_month_energy": 92.5 }
///     } } }
/// }"#;
///
/// let snapshot = EnergySnapshot::from_json_str(json).unwrap();
/// let day = snapshot.day(2025, 5, 21).unwrap();
/// assert_eq!(day.get("-Nx1").unwrap().current_month_energy, Some(92.5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergySnapshot {
    years: Children<YearNode>,
}

impl EnergySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> EnergySnapshotBuilder {
        EnergySnapshotBuilder::new()
    }

    /// Decode a snapshot document.
    ///
    /// Accepts the tree itself, a document wrapping it under `energy_data`,
    /// or `null` (an empty store).
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Decode a snapshot document from raw bytes. See [`EnergySnapshot::from_json_str`].
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Decode an already-parsed snapshot document. See [`EnergySnapshot::from_json_str`].
    pub fn from_value(mut value: serde_json::Value) -> Result<Self, SnapshotError> {
        if let Some(inner) = value.get_mut(ROOT_KEY).map(serde_json::Value::take) {
            value = inner;
        }
        if value.is_null() {
            return Ok(Self::new());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The year node for `year`, if present.
    pub fn year(&self, year: i32) -> Option<&YearNode> {
        self.years.get(&year.to_string())
    }

    /// The month node for `year`/`month`, if present.
    pub fn month(&self, year: i32, month: u32) -> Option<&MonthNode> {
        self.year(year)?.get(&month.to_string())
    }

    /// The day node for `year`/`month`/`day`, if present.
    pub fn day(&self, year: i32, month: u32, day: u32) -> Option<&DayNode> {
        self.month(year, month)?.get(&day.to_string())
    }

    /// Year nodes in key order.
    pub fn years(&self) -> &Children<YearNode> {
        &self.years
    }

    /// Check if the snapshot has no year nodes.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Total number of records across the whole tree.
    pub fn record_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|months| months.values())
            .flat_map(|days| days.values())
            .map(|records| records.len())
            .sum()
    }
}

/// Builder for constructing [`EnergySnapshot`] instances.
#[derive(Debug, Clone, Default)]
pub struct EnergySnapshotBuilder {
    years: Children<YearNode>,
}

impl EnergySnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under `year/month/day/key`, creating parent nodes as needed.
    pub fn record(
        mut self,
        year: i32,
        month: u32,
        day: u32,
        key: impl Into<String>,
        record: Record,
    ) -> Self {
        self.day_mut(year, month, day).insert(key, record);
        self
    }

    /// Add a day node with no records.
    pub fn empty_day(mut self, year: i32, month: u32, day: u32) -> Self {
        self.day_mut(year, month, day);
        self
    }

    /// Add a day node under a raw key, for keys that are not plain day numbers.
    pub fn raw_day(
        mut self,
        year: i32,
        month: u32,
        day_key: impl Into<String>,
        node: DayNode,
    ) -> Self {
        self.years
            .entry_or_default(year.to_string())
            .entry_or_default(month.to_string())
            .insert(day_key, node);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> EnergySnapshot {
        EnergySnapshot { years: self.years }
    }

    fn day_mut(&mut self, year: i32, month: u32, day: u32) -> &mut DayNode {
        self.years
            .entry_or_default(year.to_string())
            .entry_or_default(month.to_string())
            .entry_or_default(day.to_string())
    }
}
