use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use wasteguard_lib::{
    alerts::{AlertDispatcher, AlertPolicy, Notifier, OutboundMessage},
    clock::ManualClock,
    db::Database,
    error::NotifyError,
    ledger::SqliteLedger,
    models::{DeviceEvent, PeriodKind, PeriodLimits},
    pipeline::{IngestPipeline, PipelineController},
};

#[derive(Default)]
struct RecordingNotifier {
    subjects: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        self.subjects.lock().unwrap().push(message.subject.clone());
        Ok(())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    ledger: SqliteLedger,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
    pipeline: Arc<IngestPipeline<ManualClock>>,
}

fn fixture(policy: AlertPolicy) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("waste.sqlite3")).unwrap();
    let ledger = SqliteLedger::new(db, "kitchen");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = AlertDispatcher::new(
        notifier.clone(),
        "scale@example.org",
        "home@example.org",
        Duration::from_secs(5),
    );
    let pipeline = Arc::new(IngestPipeline::new(
        clock.clone(),
        Arc::new(ledger.clone()),
        dispatcher,
        PeriodLimits::new(1_000.0, 1_500.0),
        policy,
        Duration::from_secs(5),
    ));

    Fixture {
        _dir: dir,
        ledger,
        clock,
        notifier,
        pipeline,
    }
}

fn weighing(device_id: &str, weight: f64) -> DeviceEvent {
    DeviceEvent::json(
        "scale",
        device_id,
        "weight",
        format!(r#"{{"data": {{"weight": {weight}, "unit": "g"}}}}"#),
    )
}

#[tokio::test]
async fn queued_events_are_drained_on_stop() {
    let fixture = fixture(AlertPolicy::EveryEvent);
    let (tx, rx) = mpsc::channel(16);

    let mut controller = PipelineController::new();
    controller.start(fixture.pipeline.clone(), rx).unwrap();
    assert!(controller.start(fixture.pipeline.clone(), mpsc::channel(1).1).is_err());

    tx.send(weighing("bin-1", 600.0)).await.unwrap();
    tx.send(weighing("bin-2", 500.0)).await.unwrap();
    tx.send(DeviceEvent::json("scale", "bin-3", "weight", "{\"data\": \"oops\"}"))
        .await
        .unwrap();
    tx.send(weighing("bin-1", 500.0)).await.unwrap();

    controller.stop().await.unwrap();
    assert!(!controller.is_running());

    assert_eq!(
        fixture
            .ledger
            .database()
            .count_weight_readings("kitchen")
            .await
            .unwrap(),
        3
    );

    let subjects = fixture.notifier.subjects.lock().unwrap().clone();
    let monthly = subjects
        .iter()
        .filter(|s| s.starts_with("Monatslimit"))
        .count();
    let yearly = subjects
        .iter()
        .filter(|s| s.starts_with("Jahreslimit"))
        .count();
    assert_eq!(monthly, 2);
    assert_eq!(yearly, 1);
}

#[tokio::test]
async fn month_total_restarts_in_the_next_month() {
    let fixture = fixture(AlertPolicy::EveryEvent);

    let march = fixture.pipeline.process(weighing("bin-1", 1_100.0)).await;
    assert!(march.is_recorded());
    let kinds: Vec<PeriodKind> = march.alerts().iter().map(|alert| alert.kind).collect();
    assert_eq!(kinds, vec![PeriodKind::Month]);

    fixture.clock.advance(chrono::Duration::days(20));
    let april = fixture.pipeline.process(weighing("bin-1", 10.0)).await;
    assert!(april.is_recorded());
    assert!(april.alerts().is_empty());

    fixture
        .clock
        .set(Utc.with_ymd_and_hms(2024, 11, 2, 7, 0, 0).unwrap());
    let november = fixture.pipeline.process(weighing("bin-1", 400.0)).await;
    let kinds: Vec<PeriodKind> = november.alerts().iter().map(|alert| alert.kind).collect();
    assert_eq!(kinds, vec![PeriodKind::Year]);

    assert_eq!(fixture.notifier.subjects.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn stored_reading_keeps_device_attributes() {
    let fixture = fixture(AlertPolicy::OncePerPeriod);
    let outcome = fixture.pipeline.process(weighing("bin-9", 12.5)).await;
    assert!(outcome.is_recorded());

    let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
    let stored = fixture
        .ledger
        .database()
        .get_weight_readings_between("kitchen", now, now + chrono::Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].device_id, "bin-9");
    assert_eq!(stored[0].weight, 12.5);
    assert_eq!(stored[0].attributes.get("unit"), Some(&serde_json::json!("g")));
}
