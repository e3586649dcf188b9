//! Core record types
//!
//! - `HealthRecord`: one entry of an uploaded health export
//! - `RecordValue`: the string-or-number payload of a record
//! - `UploadSummary`: what the backend reports after an upload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::time::{parse_timestamp, ReportZone};

/// Record type tag for sleep intervals
pub const SLEEP_ANALYSIS: &str = "SleepAnalysis";

/// Record type tag for heart rate samples
pub const HEART_RATE: &str = "HeartRate";

/// Record type tag for resting heart rate samples
pub const RESTING_HEART_RATE: &str = "RestingHeartRate";

/// Value of a health record
///
/// Sleep records carry a state label ("AsleepCore", "Awake", ...),
/// quantity records carry a number. Some sources send numbers as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordValue {
    Number(f64),
    Text(String),
}

impl RecordValue {
    /// Textual form of the value
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RecordValue::Text(s) => Cow::Borrowed(s.as_str()),
            RecordValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Numeric form of the value, parsing text if needed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RecordValue::Number(n) => Some(*n),
            RecordValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether this value is a sleep state label meaning "asleep"
    ///
    /// Matching is a case-insensitive containment check so that source
    /// specific variants ("AsleepCore", "HKCategoryValueSleepAnalysisAsleepDeep")
    /// all count. Numbers never match.
    pub fn is_asleep(&self) -> bool {
        match self {
            RecordValue::Text(s) => s.to_ascii_lowercase().contains("asleep"),
            RecordValue::Number(_) => false,
        }
    }
}

impl std::fmt::Display for RecordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordValue::Number(n) => write!(f, "{}", n),
            RecordValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        RecordValue::Text(s)
    }
}

impl From<f64> for RecordValue {
    fn from(n: f64) -> Self {
        RecordValue::Number(n)
    }
}

/// A single health record as exported or returned by the backend
///
/// Only the fields used by the client are typed; anything else the backend
/// sends (`unit`, `sourceName`, ...) is kept in `extra` so records survive a
/// round trip through the session store unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Record type tag (e.g. "SleepAnalysis", "HeartRate")
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// State label or measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RecordValue>,
    /// Interval start (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Interval end (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Point-in-time timestamp for non-interval records (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Fields the client does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HealthRecord {
    /// Create a record of the given type with no value or dates
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            value: None,
            start_date: None,
            end_date: None,
            date: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create a sleep interval record
    pub fn sleep(
        value: impl Into<RecordValue>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self::new(SLEEP_ANALYSIS).value(value).interval(start, end)
    }

    /// Create a point-in-time record
    pub fn point(
        record_type: impl Into<String>,
        value: impl Into<RecordValue>,
        date: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(record_type).value(value);
        record.date = Some(date.into());
        record
    }

    /// Builder: set the value
    pub fn value(mut self, value: impl Into<RecordValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder: set start and end dates
    pub fn interval(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    /// Builder: attach an uninterpreted field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether this is a sleep record in an asleep state
    pub fn is_asleep(&self) -> bool {
        self.record_type == SLEEP_ANALYSIS
            && self.value.as_ref().map(RecordValue::is_asleep).unwrap_or(false)
    }

    /// Parsed interval start
    pub fn start_time(&self, zone: ReportZone) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(|s| parse_timestamp(s, zone))
    }

    /// Parsed interval end
    pub fn end_time(&self, zone: ReportZone) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(|s| parse_timestamp(s, zone))
    }

    /// The instant this record describes: `date`, falling back to `startDate`
    pub fn timestamp(&self, zone: ReportZone) -> Option<DateTime<Utc>> {
        self.date
            .as_deref()
            .and_then(|s| parse_timestamp(s, zone))
            .or_else(|| self.start_time(zone))
    }
}

/// Response body of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSummary {
    /// Human-readable status from the backend
    #[serde(default)]
    pub message: String,
    /// Number of records the backend parsed
    #[serde(default)]
    pub records_loaded: u64,
    /// Parsed records, when the backend sends them back; undecodable
    /// items are dropped
    #[serde(
        default,
        deserialize_with = "super::payload::deserialize_records",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub records: Vec<HealthRecord>,
}

impl UploadSummary {
    /// The line shown on the dashboard after an upload
    pub fn dashboard_message(&self) -> String {
        format!("{} Loaded {} records.", self.message, self.records_loaded)
    }
}
