use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::models::DeviceEvent;

use super::{worker::ingest_loop, IngestPipeline};

/// Owns the ingest worker task.
pub struct PipelineController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl PipelineController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start<C: Clock>(
        &mut self,
        pipeline: Arc<IngestPipeline<C>>,
        events: mpsc::Receiver<DeviceEvent>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("ingest pipeline already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(ingest_loop(pipeline, events, cancel_token.clone()));

        info!("Ingest pipeline started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Drains queued events, then waits for the worker to exit.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("ingest worker failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for PipelineController {
    fn default() -> Self {
        Self::new()
    }
}
