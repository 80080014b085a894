mod watson;

pub use watson::{device_event, WatsonIotSource, DEVICE_EVENTS_TOPIC};

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::DeviceEvent;

/// Owns the running event-source task.
pub struct SourceController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SourceController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(
        &mut self,
        source: WatsonIotSource,
        events: mpsc::Sender<DeviceEvent>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("event source already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(source.run(events, cancel_token.clone()));

        info!("Event source started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Stops the source; its queue sender is dropped once the task exits.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("event source task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for SourceController {
    fn default() -> Self {
        Self::new()
    }
}
