//! Record collection normalization
//!
//! The backend and the session cache hand records over either as a bare
//! array or wrapped as `{"records": [...]}`. Both shapes normalize here.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::{RecordsError, RecordsResult};
use super::types::HealthRecord;

/// Normalize a JSON payload into records
///
/// Array elements that do not decode as a record are skipped. A payload
/// that is not a collection at all is an error.
pub fn normalize_records(payload: Value) -> RecordsResult<Vec<HealthRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(RecordsError::InvalidCollection(format!(
                    "`records` field holding {}",
                    describe(&other)
                )))
            }
            None => {
                return Err(RecordsError::InvalidCollection(
                    "an object without a `records` field".to_string(),
                ))
            }
        },
        other => return Err(RecordsError::InvalidCollection(describe(&other))),
    };

    Ok(decode_records(items))
}

/// Decode each item as a record, skipping the ones that do not decode
pub fn decode_records(items: Vec<Value>) -> Vec<HealthRecord> {
    let total = items.len();
    let records: Vec<HealthRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            kept = records.len(),
            skipped = total - records.len(),
            "Normalized record collection"
        );
    }

    records
}

/// Serde adapter for record lists embedded in other bodies
///
/// Items go through `decode_records`; `null` is an empty list.
pub(crate) fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<HealthRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(decode_records(items)),
        Value::Null => Ok(Vec::new()),
        other => Err(D::Error::custom(format!(
            "expected a record list, found {}",
            describe(&other)
        ))),
    }
}

/// Normalize a JSON string into records
pub fn parse_records(json: &str) -> RecordsResult<Vec<HealthRecord>> {
    normalize_records(serde_json::from_str(json)?)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
    .to_string()
}
