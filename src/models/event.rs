use serde::{Deserialize, Serialize};

/// Raw device notification as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    pub device_type: String,
    pub device_id: String,
    pub event_type: String,
    /// Payload format announced by the transport (`json` for Watson IoT devices).
    pub format: String,
    pub payload: Vec<u8>,
}

impl DeviceEvent {
    pub fn json(
        device_type: impl Into<String>,
        device_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            device_id: device_id.into(),
            event_type: event_type.into(),
            format: "json".into(),
            payload: payload.into(),
        }
    }

    /// Payload rendered for log lines; invalid UTF-8 is replaced.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
