//! Device payload decoding.
//!
//! Devices publish `json`-format events shaped `{"data": {"weight": <number>, ...}}`.
//! A bare object that carries `weight` at the top level is accepted as well.
//! Fields other than `weight` are kept as reading attributes.

use serde_json::{Map, Value};

use crate::db::WeightReading;
use crate::error::MalformedPayload;
use crate::models::DeviceEvent;

const JSON_FORMAT: &str = "json";
const READING_KEY: &str = "data";
const WEIGHT_KEY: &str = "weight";

/// Decodes `event` into a reading with `recorded_at` left unset.
pub fn normalize(event: &DeviceEvent) -> Result<WeightReading, MalformedPayload> {
    if !event.format.eq_ignore_ascii_case(JSON_FORMAT) {
        return Err(MalformedPayload::UnsupportedFormat(event.format.clone()));
    }

    let root: Value = serde_json::from_slice(&event.payload)
        .map_err(|err| MalformedPayload::InvalidJson(err.to_string()))?;

    let mut reading = extract_reading(root)?;
    let weight = match reading.remove(WEIGHT_KEY) {
        None | Some(Value::Null) => return Err(MalformedPayload::MissingWeight),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| MalformedPayload::NonNumericWeight(number.to_string()))?,
        Some(other) => return Err(MalformedPayload::NonNumericWeight(other.to_string())),
    };

    if !weight.is_finite() || weight < 0.0 {
        return Err(MalformedPayload::InvalidWeight(weight));
    }

    Ok(WeightReading {
        id: None,
        device_type: event.device_type.clone(),
        device_id: event.device_id.clone(),
        event_type: event.event_type.clone(),
        weight,
        attributes: reading,
        recorded_at: None,
    })
}

fn extract_reading(root: Value) -> Result<Map<String, Value>, MalformedPayload> {
    let Value::Object(mut envelope) = root else {
        return Err(MalformedPayload::MissingReading);
    };

    match envelope.remove(READING_KEY) {
        Some(Value::Object(reading)) => Ok(reading),
        Some(_) => Err(MalformedPayload::MissingReading),
        None if envelope.contains_key(WEIGHT_KEY) => Ok(envelope),
        None => Err(MalformedPayload::MissingReading),
    }
}
