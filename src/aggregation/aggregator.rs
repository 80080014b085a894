use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone};

use crate::db::WeightReading;
use crate::error::StoreError;
use crate::ledger::LedgerStore;
use crate::models::{PeriodKind, PeriodWindow};

use super::window::window_for;

/// Period sum split around one ledger row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodTotals {
    /// Weights of the readings ordered before the row.
    pub before: f64,
    /// Weights of every reading in the window.
    pub total: f64,
}

/// Sums ledger weights over period windows.
#[derive(Clone)]
pub struct PeriodAggregator {
    store: Arc<dyn LedgerStore>,
    timeout: Duration,
}

impl PeriodAggregator {
    pub fn new(store: Arc<dyn LedgerStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn window_for<Tz: TimeZone>(
        &self,
        kind: PeriodKind,
        reference: &DateTime<Tz>,
    ) -> PeriodWindow {
        window_for(kind, reference)
    }

    /// Plain left fold of `weight` over every reading the half-open scan returns.
    pub async fn sum(&self, window: &PeriodWindow) -> Result<f64, StoreError> {
        let readings = self.scan(window).await?;
        Ok(readings
            .iter()
            .fold(0.0, |total, reading| total + reading.weight))
    }

    /// Sums the window, also accumulating the readings that sort before
    /// `written` in ledger order (`recorded_at`, then id).
    pub async fn totals_around(
        &self,
        window: &PeriodWindow,
        written: &WeightReading,
    ) -> Result<PeriodTotals, StoreError> {
        let readings = self.scan(window).await?;
        let marker = (written.recorded_at, written.id);

        Ok(readings.iter().fold(
            PeriodTotals {
                before: 0.0,
                total: 0.0,
            },
            |totals, reading| PeriodTotals {
                before: if (reading.recorded_at, reading.id) < marker {
                    totals.before + reading.weight
                } else {
                    totals.before
                },
                total: totals.total + reading.weight,
            },
        ))
    }

    async fn scan(&self, window: &PeriodWindow) -> Result<Vec<WeightReading>, StoreError> {
        let scan = self.store.readings_between(window.start, window.end);
        match tokio::time::timeout(self.timeout, scan).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::ledger::SqliteLedger;
    use chrono::Utc;
    use serde_json::Map;

    async fn ledger_with(
        readings: &[(f64, DateTime<Utc>)],
    ) -> (tempfile::TempDir, PeriodAggregator) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("ledger.sqlite3")).unwrap();
        let ledger = SqliteLedger::new(db, "bins");
        for (weight, recorded_at) in readings {
            ledger
                .insert_reading(&WeightReading {
                    id: None,
                    device_type: "scale".into(),
                    device_id: "bin-1".into(),
                    event_type: "weight".into(),
                    weight: *weight,
                    attributes: Map::new(),
                    recorded_at: Some(*recorded_at),
                })
                .await
                .unwrap();
        }
        let aggregator = PeriodAggregator::new(Arc::new(ledger), Duration::from_secs(5));
        (dir, aggregator)
    }

    #[tokio::test]
    async fn sum_counts_start_and_skips_end() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let window = window_for(PeriodKind::Month, &reference);
        let (_dir, aggregator) = ledger_with(&[
            (100.0, window.start),
            (200.0, reference),
            (400.0, window.end),
            (800.0, window.start - chrono::Duration::seconds(1)),
        ])
        .await;

        assert_eq!(aggregator.sum(&window).await.unwrap(), 300.0);
    }

    #[tokio::test]
    async fn sum_is_stable_without_new_writes() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (_dir, aggregator) = ledger_with(&[(0.1, reference), (0.2, reference)]).await;
        let window = aggregator.window_for(PeriodKind::Year, &reference);

        let first = aggregator.sum(&window).await.unwrap();
        let second = aggregator.sum(&window).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 0.1 + 0.2);
    }

    #[tokio::test]
    async fn empty_window_sums_to_zero() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let (_dir, aggregator) = ledger_with(&[]).await;
        let window = window_for(PeriodKind::Month, &reference);
        assert_eq!(aggregator.sum(&window).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn before_excludes_the_written_row_exactly() {
        let reference = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let (_dir, aggregator) = ledger_with(&[
            (0.6, reference),
            (2.0, reference + chrono::Duration::seconds(1)),
        ])
        .await;
        let window = aggregator.window_for(PeriodKind::Month, &reference);

        let written = WeightReading {
            id: Some(2),
            device_type: "scale".into(),
            device_id: "bin-1".into(),
            event_type: "weight".into(),
            weight: 2.0,
            attributes: Map::new(),
            recorded_at: Some(reference + chrono::Duration::seconds(1)),
        };
        let totals = aggregator.totals_around(&window, &written).await.unwrap();
        assert_eq!(totals.before, 0.6);
        assert_eq!(totals.total, 0.6 + 2.0);
    }

    #[tokio::test]
    async fn row_outside_the_window_leaves_before_equal_to_total() {
        let reference = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let (_dir, aggregator) = ledger_with(&[(300.0, reference)]).await;
        let window = aggregator.window_for(PeriodKind::Month, &reference);

        let written = WeightReading {
            id: Some(2),
            device_type: "scale".into(),
            device_id: "bin-1".into(),
            event_type: "weight".into(),
            weight: 50.0,
            attributes: Map::new(),
            recorded_at: Some(window.end),
        };
        let totals = aggregator.totals_around(&window, &written).await.unwrap();
        assert_eq!(totals.before, totals.total);
        assert_eq!(totals.total, 300.0);
    }

    struct StalledLedger;

    #[async_trait::async_trait]
    impl LedgerStore for StalledLedger {
        async fn insert_reading(&self, _reading: &WeightReading) -> Result<i64, StoreError> {
            std::future::pending().await
        }

        async fn readings_between(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<WeightReading>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_scan_times_out() {
        let aggregator = PeriodAggregator::new(Arc::new(StalledLedger), Duration::from_secs(10));
        let reference = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let window = window_for(PeriodKind::Year, &reference);

        let err = aggregator.sum(&window).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout(wait) if wait == Duration::from_secs(10)));
    }
}
