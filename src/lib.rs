pub mod aggregation;
pub mod alerts;
pub mod clock;
pub mod db;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod settings;
pub mod source;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::mpsc;

use alerts::{AlertDispatcher, SmtpNotifier};
use clock::SystemClock;
use db::Database;
use ledger::SqliteLedger;
use pipeline::{IngestPipeline, PipelineController};
use settings::Settings;
use source::{SourceController, WatsonIotSource};

/// Starts the ledger, the ingest pipeline and the event source, then runs
/// until Ctrl-C. The ledger is opened before the subscription starts.
pub async fn run() -> Result<()> {
    let dotenv_path = settings::load_dotenv();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("WasteGuard starting up...");
    if let Some(path) = dotenv_path {
        info!("Loaded settings from {}", path.display());
    }

    let settings = Settings::from_env().context("invalid settings")?;

    let db_path = settings.ledger.path.clone();
    let database = tokio::task::spawn_blocking(move || Database::new(db_path))
        .await
        .context("ledger startup task failed")??;
    let ledger = SqliteLedger::new(database, settings.ledger.collection.clone());
    let existing = ledger
        .database()
        .count_weight_readings(ledger.collection())
        .await?;
    info!(
        "Ledger collection '{}' holds {} readings",
        ledger.collection(),
        existing
    );

    let notifier = SmtpNotifier::new(&settings.mail).context("failed to set up mail relay")?;
    let dispatcher = AlertDispatcher::new(
        Arc::new(notifier),
        settings.mail.user.clone(),
        settings.mail.recipient.clone(),
        settings.notify_timeout,
    );

    let pipeline = Arc::new(IngestPipeline::new(
        Arc::new(SystemClock),
        Arc::new(ledger),
        dispatcher,
        settings.limits,
        settings.alert_policy,
        settings.store_timeout,
    ));
    info!(
        "Alert policy {} (month limit {}, year limit {})",
        settings.alert_policy.as_str(),
        settings.limits.for_kind(models::PeriodKind::Month).max_weight,
        settings.limits.for_kind(models::PeriodKind::Year).max_weight
    );

    let (event_tx, event_rx) = mpsc::channel(settings.queue_capacity);

    let mut pipeline_controller = PipelineController::new();
    pipeline_controller.start(pipeline, event_rx)?;

    let mut source_controller = SourceController::new();
    source_controller.start(WatsonIotSource::new(settings.source.clone()), event_tx)?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested; draining queued events");

    source_controller.stop().await?;
    pipeline_controller.stop().await?;

    info!("WasteGuard stopped");
    Ok(())
}
