//! Latest-reading aggregation over a store snapshot.
//!
//! Every function here is a pure query over an immutable [`EnergySnapshot`].
//! Nothing is cached between calls; the same snapshot always yields the same
//! answers. "Now" is never read from a clock: callers pass the year, month
//! and day they are interested in.
//!
//! The month-level queries compose three "latest" selections:
//!
//! ```text
//! snapshot[year][month] ──▶ latest_day_in_month (max day key, numeric)
//!                                    │
//!                                    ▼
//!                       latest_record_in_day (max parsed timestamp)
//!                                    │
//!                                    ▼
//!                       record.current_month_energy
//! ```
//!
//! The day is chosen by key alone. If the numerically largest day holds no
//! parseable record, the month reports no data even when an earlier day
//! does; callers rely on that behaviour matching the store's writer.

use serde::Serialize;
use tracing::warn;

use meter_types::{DayNode, EnergySnapshot, MonthNode, Record, Timestamp, YearMonth};

/// Instantaneous electrical readings from one record.
///
/// Each field is `None` when the record did not carry it. An unknown reading
/// is never reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub frequency: Option<f64>,
}

impl From<&Record> for Metrics {
    fn from(record: &Record) -> Self {
        Self {
            voltage: record.voltage,
            current: record.current,
            frequency: record.frequency,
        }
    }
}

/// One point of the yearly trend: the month-end energy total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Month number, `1..=12`.
    pub month: u32,
    pub kwh: f64,
}

/// Monthly energy totals for one calendar year, January first.
///
/// Always holds exactly twelve points; months without data are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub year: i32,
    pub points: [TrendPoint; 12],
}

impl TrendSeries {
    /// Iterate over `(label, kwh)` pairs in calendar order.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.points
            .iter()
            .map(move |p| (YearMonth::new(self.year, p.month).label(), p.kwh))
    }

    /// Largest monthly total in the series (`0.0` for an empty year).
    pub fn max_kwh(&self) -> f64 {
        self.points.iter().map(|p| p.kwh).fold(0.0, f64::max)
    }

    /// Sum of all monthly totals.
    pub fn total_kwh(&self) -> f64 {
        self.points.iter().map(|p| p.kwh).sum()
    }
}

/// Find the authoritative record of a day: the one with the latest timestamp.
///
/// Records without a `timestamp`, or whose timestamp does not parse, are
/// skipped (parse failures are logged). When two records share the latest
/// timestamp the first one in key order wins. Returns `None` for an absent
/// or empty day, or one where no record has a usable timestamp.
pub fn latest_record_in_day(day: Option<&DayNode>) -> Option<&Record> {
    let mut latest: Option<(Timestamp, &Record)> = None;

    for (key, record) in day?.iter() {
        let timestamp = match record.parsed_timestamp() {
            Some(Ok(ts)) => ts,
            Some(Err(e)) => {
                warn!(record = %key, "Skipping record with unusable timestamp: {}", e);
                continue;
            }
            None => continue,
        };

        let is_later = latest.as_ref().map_or(true, |(best, _)| timestamp > *best);
        if is_later {
            latest = Some((timestamp, record));
        }
    }

    latest.map(|(_, record)| record)
}

/// Find the day key with the largest numeric value in a month.
///
/// Keys are compared as integers, so `"10"` beats `"9"`. Keys that are not
/// integers are skipped and logged. The contents of the days are not
/// inspected. Returns `None` for an absent or empty month.
pub fn latest_day_in_month(month: Option<&MonthNode>) -> Option<&str> {
    let mut latest: Option<(i64, &str)> = None;

    for key in month?.keys() {
        let day = match key.trim().parse::<i64>() {
            Ok(day) => day,
            Err(e) => {
                warn!(day = %key, "Skipping non-numeric day key: {}", e);
                continue;
            }
        };

        if latest.map_or(true, |(best, _)| day > best) {
            latest = Some((day, key.as_str()));
        }
    }

    latest.map(|(_, key)| key)
}

/// The record a month-level query reads: the latest record of the latest day.
pub fn latest_reading(snapshot: &EnergySnapshot, year: i32, month: u32) -> Option<&Record> {
    let month_node = snapshot.month(year, month)?;
    let day = latest_day_in_month(Some(month_node))?;
    latest_record_in_day(month_node.get(day))
}

/// Cumulative energy for a month, in kWh.
///
/// `0.0` when the month is absent, has no days, its latest day has no usable
/// record, or that record has no `current_month_energy`.
pub fn monthly_energy(snapshot: &EnergySnapshot, year: i32, month: u32) -> f64 {
    latest_reading(snapshot, year, month)
        .and_then(|record| record.current_month_energy)
        .unwrap_or(0.0)
}

/// Latest voltage, current and frequency recorded on an exact day.
///
/// No "latest day" search happens here. Returns `None` when the day is absent
/// or has no usable record.
pub fn instantaneous_metrics(
    snapshot: &EnergySnapshot,
    year: i32,
    month: u32,
    day: u32,
) -> Option<Metrics> {
    latest_record_in_day(snapshot.day(year, month, day)).map(Metrics::from)
}

/// Monthly energy for January through December of `year`.
pub fn trend_series(snapshot: &EnergySnapshot, year: i32) -> TrendSeries {
    let points = std::array::from_fn(|i| {
        let month = i as u32 + 1;
        TrendPoint {
            month,
            kwh: monthly_energy(snapshot, year, month),
        }
    });

    TrendSeries { year, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_types::Children;

    fn may_2025() -> EnergySnapshot {
        EnergySnapshot::builder()
            .record(2025, 5, 20, "r1", Record::at("2025-5-20 09:00").with_energy(80.0))
            .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_energy(92.5))
            .build()
    }

    fn day(records: &[(&str, Record)]) -> DayNode {
        records.iter().map(|(k, r)| (*k, r.clone())).collect()
    }

    #[test]
    fn test_latest_record_picks_max_timestamp() {
        let node = day(&[
            ("a", Record::at("2025-5-21 9:30").with_energy(1.0)),
            ("b", Record::at("2025-5-21 13:05").with_energy(2.0)),
            ("c", Record::at("2025-5-21 11:45").with_energy(3.0)),
        ]);

        let latest = latest_record_in_day(Some(&node)).unwrap();
        assert_eq!(latest.current_month_energy, Some(2.0));
    }

    #[test]
    fn test_latest_record_tie_keeps_first_in_key_order() {
        let node = day(&[
            ("k2", Record::at("2025-5-21 11:45").with_energy(2.0)),
            ("k1", Record::at("2025-5-21 11:45").with_energy(1.0)),
        ]);

        let latest = latest_record_in_day(Some(&node)).unwrap();
        assert_eq!(latest.current_month_energy, Some(1.0));
    }

    #[test]
    fn test_latest_record_empty_or_absent() {
        assert!(latest_record_in_day(None).is_none());
        assert!(latest_record_in_day(Some(&DayNode::new())).is_none());
    }

    #[test]
    fn test_latest_record_skips_missing_and_malformed_timestamps() {
        let node = day(&[
            ("a", Record::default().with_energy(500.0)),
            ("b", Record::at("not a time").with_energy(600.0)),
            ("c", Record::at("2025-5-21 08:00").with_energy(7.0)),
        ]);

        let latest = latest_record_in_day(Some(&node)).unwrap();
        assert_eq!(latest.current_month_energy, Some(7.0));
    }

    #[test]
    fn test_latest_record_none_when_no_timestamp_parses() {
        let node = day(&[
            ("a", Record::default().with_energy(500.0)),
            ("b", Record::at("2025-5-21 99:99")),
        ]);

        assert!(latest_record_in_day(Some(&node)).is_none());
    }

    #[test]
    fn test_latest_day_is_numeric_not_lexicographic() {
        let month: MonthNode = [("9", DayNode::new()), ("10", DayNode::new())]
            .into_iter()
            .collect();

        assert_eq!(latest_day_in_month(Some(&month)), Some("10"));
    }

    #[test]
    fn test_latest_day_empty_or_absent() {
        assert!(latest_day_in_month(None).is_none());
        assert!(latest_day_in_month(Some(&Children::new())).is_none());
    }

    #[test]
    fn test_latest_day_skips_non_numeric_keys() {
        let month: MonthNode = [("3", DayNode::new()), ("summary", DayNode::new())]
            .into_iter()
            .collect();

        assert_eq!(latest_day_in_month(Some(&month)), Some("3"));
    }

    #[test]
    fn test_monthly_energy_uses_latest_day() {
        assert_eq!(monthly_energy(&may_2025(), 2025, 5), 92.5);
    }

    #[test]
    fn test_monthly_energy_absent_subtrees_are_zero() {
        let snapshot = may_2025();
        assert_eq!(monthly_energy(&snapshot, 2024, 5), 0.0);
        assert_eq!(monthly_energy(&snapshot, 2025, 6), 0.0);
        assert_eq!(monthly_energy(&EnergySnapshot::new(), 2025, 5), 0.0);
    }

    #[test]
    fn test_monthly_energy_empty_latest_day_hides_earlier_data() {
        let snapshot = EnergySnapshot::builder()
            .record(2025, 5, 20, "r1", Record::at("2025-5-20 09:00").with_energy(80.0))
            .empty_day(2025, 5, 21)
            .build();

        assert_eq!(latest_day_in_month(snapshot.month(2025, 5)), Some("21"));
        assert_eq!(monthly_energy(&snapshot, 2025, 5), 0.0);
    }

    #[test]
    fn test_monthly_energy_ignores_record_without_timestamp() {
        let snapshot = EnergySnapshot::builder()
            .record(2025, 5, 21, "r1", Record::default().with_energy(92.5))
            .build();

        assert!(latest_record_in_day(snapshot.day(2025, 5, 21)).is_none());
        assert_eq!(monthly_energy(&snapshot, 2025, 5), 0.0);
    }

    #[test]
    fn test_monthly_energy_survives_stray_scalars() {
        let json = r#"{"2025": {
            "4": {"30": {"a": {"timestamp": "2025-4-30 23:50", "current_month_energy": 310.0}}},
            "5": {
                "21": {
                    "r1": {"timestamp": "2025-5-21 11:45", "current_month_energy": 92.5},
                    "count": 3
                },
                "note": "x"
            }
        }}"#;
        let snapshot = EnergySnapshot::from_json_str(json).unwrap();

        assert_eq!(monthly_energy(&snapshot, 2025, 5), 92.5);
        assert_eq!(monthly_energy(&snapshot, 2025, 4), 310.0);
    }

    #[test]
    fn test_monthly_energy_missing_field_is_zero() {
        let snapshot = EnergySnapshot::builder()
            .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_voltage(230.0))
            .build();

        assert_eq!(monthly_energy(&snapshot, 2025, 5), 0.0);
    }

    #[test]
    fn test_latest_reading_day_ten_beats_day_nine() {
        let snapshot = EnergySnapshot::builder()
            .record(2025, 3, 9, "r", Record::at("2025-3-9 23:00").with_energy(40.0))
            .record(2025, 3, 10, "r", Record::at("2025-3-10 06:00").with_energy(41.5))
            .build();

        let record = latest_reading(&snapshot, 2025, 3).unwrap();
        assert_eq!(record.timestamp.as_deref(), Some("2025-3-10 06:00"));
        assert_eq!(monthly_energy(&snapshot, 2025, 3), 41.5);
    }

    #[test]
    fn test_instantaneous_metrics_exact_day() {
        let snapshot = EnergySnapshot::builder()
            .record(
                2025,
                5,
                21,
                "old",
                Record::at("2025-5-21 08:00").with_voltage(228.0).with_current(1.0),
            )
            .record(
                2025,
                5,
                21,
                "new",
                Record::at("2025-5-21 11:45").with_voltage(231.4).with_frequency(49.98),
            )
            .build();

        let metrics = instantaneous_metrics(&snapshot, 2025, 5, 21).unwrap();
        assert_eq!(metrics.voltage, Some(231.4));
        assert_eq!(metrics.current, None);
        assert_eq!(metrics.frequency, Some(49.98));
    }

    #[test]
    fn test_instantaneous_metrics_does_not_search_other_days() {
        let snapshot = may_2025();
        assert!(instantaneous_metrics(&snapshot, 2025, 5, 22).is_none());
        assert!(instantaneous_metrics(&snapshot, 2025, 5, 21).is_some());
    }

    #[test]
    fn test_trend_series_always_twelve_points() {
        let series = trend_series(&may_2025(), 2025);
        assert_eq!(series.points.len(), 12);

        let months: Vec<u32> = series.points.iter().map(|p| p.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());

        assert_eq!(series.points[4].kwh, 92.5);
        assert_eq!(series.total_kwh(), 92.5);
        assert_eq!(series.max_kwh(), 92.5);

        let empty = trend_series(&EnergySnapshot::new(), 2030);
        assert!(empty.points.iter().all(|p| p.kwh == 0.0));
    }

    #[test]
    fn test_trend_series_labels() {
        let series = trend_series(&may_2025(), 2025);
        let labels: Vec<&str> = series.labelled().map(|(label, _)| label).collect();
        assert_eq!(labels.first(), Some(&"Jan"));
        assert_eq!(labels.get(4), Some(&"May"));
        assert_eq!(labels.last(), Some(&"Dec"));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let snapshot = may_2025();
        assert_eq!(
            trend_series(&snapshot, 2025),
            trend_series(&snapshot, 2025)
        );
        assert_eq!(
            instantaneous_metrics(&snapshot, 2025, 5, 21),
            instantaneous_metrics(&snapshot, 2025, 5, 21)
        );
        assert_eq!(monthly_energy(&snapshot, 2025, 5), monthly_energy(&snapshot, 2025, 5));
    }
}
