//! Per-event ingestion: normalize, append, then check both period limits.

mod controller;
mod worker;

pub use controller::PipelineController;
pub use worker::ingest_loop;

use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::aggregation::PeriodAggregator;
use crate::alerts::{AlertDispatcher, AlertPolicy, ThresholdEvaluator};
use crate::clock::Clock;
use crate::db::WeightReading;
use crate::error::{MalformedPayload, StoreError};
use crate::ingest::normalize;
use crate::ledger::{LedgerStore, LedgerWriter};
use crate::models::{AlertEvent, DeviceEvent, PeriodKind, PeriodLimits, PeriodWindow};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Result of one period check after a successful append.
#[derive(Debug)]
pub enum PeriodCheck {
    /// Sum at or under the limit, or the policy suppressed a repeat alert.
    Quiet { kind: PeriodKind, sum: f64 },
    /// Alert produced; `delivered` is false when the notifier failed.
    Alerted {
        alert: AlertEvent,
        sum: f64,
        delivered: bool,
    },
    /// Scan failed; this period is skipped for this event.
    Failed { kind: PeriodKind, error: StoreError },
}

impl PeriodCheck {
    pub fn kind(&self) -> PeriodKind {
        match self {
            PeriodCheck::Quiet { kind, .. } | PeriodCheck::Failed { kind, .. } => *kind,
            PeriodCheck::Alerted { alert, .. } => alert.kind,
        }
    }
}

#[derive(Debug)]
pub enum EventOutcome {
    /// Payload could not be decoded; nothing was written.
    Rejected(MalformedPayload),
    /// Append failed; the event was dropped and no limits were checked.
    StoreFailed(StoreError),
    Recorded {
        reading: WeightReading,
        checks: Vec<PeriodCheck>,
    },
}

impl EventOutcome {
    pub fn alerts(&self) -> Vec<&AlertEvent> {
        match self {
            EventOutcome::Recorded { checks, .. } => checks
                .iter()
                .filter_map(|check| match check {
                    PeriodCheck::Alerted { alert, .. } => Some(alert),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, EventOutcome::Recorded { .. })
    }
}

pub struct IngestPipeline<C: Clock> {
    clock: Arc<C>,
    writer: LedgerWriter,
    aggregator: PeriodAggregator,
    evaluator: ThresholdEvaluator,
    limits: PeriodLimits,
    dispatcher: AlertDispatcher,
}

impl<C: Clock> IngestPipeline<C> {
    pub fn new(
        clock: Arc<C>,
        store: Arc<dyn LedgerStore>,
        dispatcher: AlertDispatcher,
        limits: PeriodLimits,
        policy: AlertPolicy,
        store_timeout: Duration,
    ) -> Self {
        Self {
            clock,
            writer: LedgerWriter::new(Arc::clone(&store), store_timeout),
            aggregator: PeriodAggregator::new(store, store_timeout),
            evaluator: ThresholdEvaluator::new(policy),
            limits,
            dispatcher,
        }
    }

    /// Runs one event to completion. Failures are logged here and reported in
    /// the outcome; they never propagate.
    pub async fn process(&self, event: DeviceEvent) -> EventOutcome {
        log_info!(
            "INCOMING_EVENT device={} event={} payload={}",
            event.device_id,
            event.event_type,
            event.payload_lossy()
        );

        let reading = match normalize(&event) {
            Ok(reading) => reading,
            Err(err) => {
                log_warn!(
                    "MALFORMED_PAYLOAD device={} event={}: {err}",
                    event.device_id,
                    event.event_type
                );
                return EventOutcome::Rejected(err);
            }
        };

        // Windows come from the same instant the reading is stamped with.
        let (now, windows) = {
            let now = self.clock.now();
            let windows = PeriodKind::ALL.map(|kind| self.aggregator.window_for(kind, &now));
            (now.with_timezone(&Utc), windows)
        };

        let reading = match self.writer.append(reading, now).await {
            Ok(reading) => reading,
            Err(err) => {
                log_error!(
                    "ERROR_DB device={} event={}: {err}",
                    event.device_id,
                    event.event_type
                );
                return EventOutcome::StoreFailed(err);
            }
        };
        log_info!(
            "INSERTED_DB device={} weight={}",
            reading.device_id,
            reading.weight
        );

        let [month, year] = windows;
        let (month, year) = tokio::join!(
            self.check_period(month, &reading),
            self.check_period(year, &reading)
        );

        EventOutcome::Recorded {
            reading,
            checks: vec![month, year],
        }
    }

    async fn check_period(&self, window: PeriodWindow, reading: &WeightReading) -> PeriodCheck {
        let kind = window.kind;
        let totals = match self.aggregator.totals_around(&window, reading).await {
            Ok(totals) => totals,
            Err(error) => {
                log_error!(
                    "ERROR_DB {} sum failed after device={} event={}: {error}",
                    kind.as_str(),
                    reading.device_id,
                    reading.event_type
                );
                return PeriodCheck::Failed { kind, error };
            }
        };
        let sum = totals.total;

        if let Some(recorded_at) = reading.recorded_at.filter(|at| !window.contains(at)) {
            log_warn!(
                "reading recorded at {recorded_at} falls outside its {} window",
                kind.as_str()
            );
        }
        let limit = self.limits.for_kind(kind);

        let Some(alert) = self
            .evaluator
            .evaluate_ingestion(kind, &totals, limit)
        else {
            return PeriodCheck::Quiet { kind, sum };
        };

        log_info!(
            "Reached {} limit: sum={} limit={}",
            kind.as_str(),
            sum,
            limit.max_weight
        );

        let delivered = match self.dispatcher.dispatch(&alert).await {
            Ok(()) => true,
            Err(err) => {
                log_error!(
                    "ERROR_EMAIL {} alert after device={}: {err}",
                    kind.as_str(),
                    reading.device_id
                );
                false
            }
        };

        PeriodCheck::Alerted {
            alert,
            sum,
            delivered,
        }
    }
}
