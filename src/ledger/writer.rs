use std::{sync::Arc, time::Duration};

use chrono::{DateTime, SubsecRound, Utc};

use crate::db::WeightReading;
use crate::error::StoreError;

use super::LedgerStore;

/// Stamps readings with the server clock and appends them to the ledger.
#[derive(Clone)]
pub struct LedgerWriter {
    store: Arc<dyn LedgerStore>,
    timeout: Duration,
}

impl LedgerWriter {
    pub fn new(store: Arc<dyn LedgerStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Sets `recorded_at = now` (at ledger precision) and inserts the reading.
    /// Returns the reading as stored, id included.
    pub async fn append(
        &self,
        mut reading: WeightReading,
        now: DateTime<Utc>,
    ) -> Result<WeightReading, StoreError> {
        reading.recorded_at = Some(now.trunc_subsecs(6));

        let insert = self.store.insert_reading(&reading);
        let inserted = tokio::time::timeout(self.timeout, insert).await;
        match inserted {
            Ok(Ok(id)) => {
                reading.id = Some(id);
                Ok(reading)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}
