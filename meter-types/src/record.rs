//! A single metering record.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Timestamp, TimestampError};

/// One timestamped reading from the meter.
///
/// Field names match the store exactly. Every field is optional: the device
/// may omit any of them, and a value of the wrong JSON type decodes as `None`
/// so that one bad record cannot invalidate a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Reading time, `"{year}-{month}-{day} {hour}:{minute}"`.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    /// Cumulative energy for the calendar month as of this reading, in kWh.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_month_energy: Option<f64>,

    /// Instantaneous voltage, in volts.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub voltage: Option<f64>,

    /// Instantaneous current, in amperes.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub current: Option<f64>,

    /// Instantaneous grid frequency, in hertz.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub frequency: Option<f64>,
}

impl Record {
    /// Start a record stamped with `timestamp` (not validated).
    pub fn at(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            ..Self::default()
        }
    }

    pub fn with_energy(mut self, kwh: f64) -> Self {
        self.current_month_energy = Some(kwh);
        self
    }

    pub fn with_voltage(mut self, volts: f64) -> Self {
        self.voltage = Some(volts);
        self
    }

    pub fn with_current(mut self, amps: f64) -> Self {
        self.current = Some(amps);
        self
    }

    pub fn with_frequency(mut self, hertz: f64) -> Self {
        self.frequency = Some(hertz);
        self
    }

    /// Parse the `timestamp` field.
    ///
    /// Returns `None` when the field is absent and `Some(Err(_))` when it is
    /// present but malformed.
    pub fn parsed_timestamp(&self) -> Option<Result<Timestamp, TimestampError>> {
        self.timestamp.as_deref().map(str::parse)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Other(serde::de::IgnoredAny),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Lenient::<f64>::deserialize(deserializer)? {
        Lenient::Valid(v) => Some(v),
        Lenient::Other(_) => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Lenient::<String>::deserialize(deserializer)? {
        Lenient::Valid(v) => Some(v),
        Lenient::Other(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "timestamp": "2025-5-21 11:45",
            "current_month_energy": 92.5,
            "voltage": 229.8,
            "current": 4.2,
            "frequency": 50.01
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp.as_deref(), Some("2025-5-21 11:45"));
        assert_eq!(record.current_month_energy, Some(92.5));
        assert_eq!(record.voltage, Some(229.8));
        assert_eq!(record.current, Some(4.2));
        assert_eq!(record.frequency, Some(50.01));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let record: Record = serde_json::from_str(r#"{"voltage": 231}"#).unwrap();
        assert!(record.timestamp.is_none());
        assert!(record.current_month_energy.is_none());
        assert_eq!(record.voltage, Some(231.0));
    }

    #[test]
    fn test_deserialize_wrong_types_as_absent() {
        let json = r#"{
            "timestamp": 1716291900,
            "current_month_energy": "92.5",
            "voltage": null,
            "current": true,
            "frequency": {"hz": 50}
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record, Record::default());
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let record: Record =
            serde_json::from_str(r#"{"timestamp": "2025-5-21 11:45", "power_factor": 0.97}"#)
                .unwrap();
        assert_eq!(record, Record::at("2025-5-21 11:45"));
    }

    #[test]
    fn test_parsed_timestamp() {
        assert!(Record::default().parsed_timestamp().is_none());
        assert!(Record::at("2025-5-21 11:45").parsed_timestamp().unwrap().is_ok());
        assert!(Record::at("soon").parsed_timestamp().unwrap().is_err());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let json = serde_json::to_string(&Record::at("2025-5-21 11:45").with_energy(1.5)).unwrap();
        assert_eq!(json, r#"{"timestamp":"2025-5-21 11:45","current_month_energy":1.5}"#);
    }
}
