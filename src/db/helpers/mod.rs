use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Ledger timestamps are stored as UTC microseconds.
pub fn to_micros(value: &DateTime<Utc>) -> i64 {
    value.timestamp_micros()
}

pub fn from_micros(value: i64, field: &str) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(value)
        .ok_or_else(|| anyhow!("{field} value {value} is out of range"))
}

pub fn parse_attributes(value: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(value).context("failed to parse attributes_json")
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}
