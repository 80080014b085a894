//! Weight reading data model.
//!
//! One row of the ledger: what a device reported plus the server-assigned
//! insertion time every period query keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightReading {
    pub id: Option<i64>,
    pub device_type: String,
    pub device_id: String,
    pub event_type: String,
    pub weight: f64,
    /// Remaining fields of the device's reading object, kept verbatim.
    pub attributes: Map<String, Value>,
    /// Unset until the ledger writer assigns the server clock.
    pub recorded_at: Option<DateTime<Utc>>,
}
