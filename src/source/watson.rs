//! Watson IoT Platform application client.
//!
//! Applications connect to `<org>.messaging.<domain>` with client id
//! `a:<org>:<app id>`, authenticate with an API key/token pair and receive
//! device events on `iot-2/type/<type>/id/<id>/evt/<event>/fmt/<format>`.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS, Transport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::DeviceEvent;
use crate::settings::SourceSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const MQTT_TLS_PORT: u16 = 8883;
const KEEP_ALIVE_SECS: u64 = 30;
const RECONNECT_DELAY_SECS: u64 = 1;
const REQUEST_CAPACITY: usize = 64;
pub const DEVICE_EVENTS_TOPIC: &str = "iot-2/type/+/id/+/evt/+/fmt/+";

pub struct WatsonIotSource {
    settings: SourceSettings,
}

impl WatsonIotSource {
    pub fn new(settings: SourceSettings) -> Self {
        Self { settings }
    }

    pub fn client_id(&self) -> String {
        format!("a:{}:{}", self.settings.org, self.settings.app_id)
    }

    pub fn host(&self) -> String {
        format!("{}.messaging.{}", self.settings.org, self.settings.domain)
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id(), self.host(), MQTT_TLS_PORT);
        options.set_credentials(
            self.settings.api_key.clone(),
            self.settings.auth_token.clone(),
        );
        options.set_keep_alive(Duration::from_secs(KEEP_ALIVE_SECS));
        options.set_transport(Transport::tls_with_default_config());
        options
    }

    /// Pumps device events into `events` until cancelled or the receiver is
    /// dropped. Connection failures are logged and retried.
    pub async fn run(self, events: mpsc::Sender<DeviceEvent>, cancel_token: CancellationToken) {
        let (client, mut eventloop) = AsyncClient::new(self.options(), REQUEST_CAPACITY);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    if let Err(err) = client.disconnect().await {
                        log_warn!("failed to request disconnect: {err}");
                    }
                    log_info!("event source shutting down");
                    break;
                }
                polled = eventloop.poll() => match polled {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        log_info!("CONNECTED_IBMIOTF host={}", self.host());
                        // Sessions are clean, so the subscription is renewed on every connect.
                        let subscribed = client
                            .subscribe(DEVICE_EVENTS_TOPIC, QoS::AtLeastOnce)
                            .await;
                        if let Err(err) = subscribed {
                            log_error!("ERROR_IBMIOTF: subscribe failed: {err}");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let payload = publish.payload.to_vec();
                        let Some(event) = device_event(&publish.topic, payload) else {
                            log_warn!("ignoring message on unexpected topic {}", publish.topic);
                            continue;
                        };
                        if events.send(event).await.is_err() {
                            log_warn!("event queue closed; stopping event source");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        log_error!("ERROR_IBMIOTF: {err}");
                        tokio::select! {
                            _ = cancel_token.cancelled() => {}
                            _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => {}
                        }
                    }
                }
            }
        }
    }
}

/// Builds a device event from a topic of the form
/// `iot-2/type/<type>/id/<id>/evt/<event>/fmt/<format>`.
pub fn device_event(topic: &str, payload: Vec<u8>) -> Option<DeviceEvent> {
    let parts: Vec<&str> = topic.split('/').collect();
    match parts.as_slice() {
        ["iot-2", "type", device_type, "id", device_id, "evt", event_type, "fmt", format]
            if [device_type, device_id, event_type, format]
                .iter()
                .all(|part| !part.is_empty()) =>
        {
            Some(DeviceEvent {
                device_type: device_type.to_string(),
                device_id: device_id.to_string(),
                event_type: event_type.to_string(),
                format: format.to_string(),
                payload,
            })
        }
        _ => None,
    }
}
