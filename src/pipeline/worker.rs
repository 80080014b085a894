use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::models::DeviceEvent;

use super::IngestPipeline;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Single consumer over the event queue. Each event is processed to completion
/// before the next is pulled. On cancellation the queue is closed and whatever
/// is already in it is still processed.
pub async fn ingest_loop<C: Clock>(
    pipeline: Arc<IngestPipeline<C>>,
    mut events: mpsc::Receiver<DeviceEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("ingest loop draining");
                break;
            }
            event = events.recv() => match event {
                Some(event) => {
                    pipeline.process(event).await;
                }
                None => {
                    log_info!("event queue closed; ingest loop stopping");
                    return;
                }
            }
        }
    }

    events.close();
    let mut drained = 0usize;
    while let Some(event) = events.recv().await {
        pipeline.process(event).await;
        drained += 1;
    }
    log_info!("ingest loop stopped after draining {} queued events", drained);
}
