//! Ledger seam: the store the pipeline appends to and scans.

mod writer;

pub use writer::LedgerWriter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::{Database, WeightReading};
use crate::error::StoreError;

/// Append-and-scan store keyed by insertion time.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durably inserts a reading whose `recorded_at` is already set and
    /// returns its id. Ids grow with insertion order.
    async fn insert_reading(&self, reading: &WeightReading) -> Result<i64, StoreError>;

    /// Readings with `start <= recorded_at < end`, oldest first.
    async fn readings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeightReading>, StoreError>;
}

/// SQLite ledger scoped to one collection.
#[derive(Clone)]
pub struct SqliteLedger {
    db: Database,
    collection: String,
}

impl SqliteLedger {
    pub fn new(db: Database, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn insert_reading(&self, reading: &WeightReading) -> Result<i64, StoreError> {
        let id = self
            .db
            .insert_weight_reading(&self.collection, reading)
            .await?;
        Ok(id)
    }

    async fn readings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeightReading>, StoreError> {
        let readings = self
            .db
            .get_weight_readings_between(&self.collection, start, end)
            .await?;
        Ok(readings)
    }
}
