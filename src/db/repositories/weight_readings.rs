use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{from_micros, parse_attributes, to_micros, to_u64},
    models::WeightReading,
};

fn row_to_reading(row: &Row) -> Result<WeightReading> {
    let attributes_json: String = row.get("attributes_json")?;
    let recorded_at: i64 = row.get("recorded_at")?;

    Ok(WeightReading {
        id: row.get("id")?,
        device_type: row.get("device_type")?,
        device_id: row.get("device_id")?,
        event_type: row.get("event_type")?,
        weight: row.get("weight")?,
        attributes: parse_attributes(&attributes_json)?,
        recorded_at: Some(from_micros(recorded_at, "recorded_at")?),
    })
}

impl Database {
    /// Inserts one reading and returns its row id. The reading must already
    /// carry its `recorded_at`.
    pub async fn insert_weight_reading(
        &self,
        collection: &str,
        reading: &WeightReading,
    ) -> Result<i64> {
        let collection = collection.to_string();
        let record = reading.clone();
        self.execute(move |conn| {
            let recorded_at = record
                .recorded_at
                .as_ref()
                .map(to_micros)
                .ok_or_else(|| anyhow!("reading has no recorded_at"))?;
            let attributes_json = serde_json::to_string(&record.attributes)
                .context("failed to serialize reading attributes")?;

            conn.execute(
                "INSERT INTO weight_readings (
                    collection,
                    device_type,
                    device_id,
                    event_type,
                    weight,
                    attributes_json,
                    recorded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    collection,
                    record.device_type,
                    record.device_id,
                    record.event_type,
                    record.weight,
                    attributes_json,
                    recorded_at,
                ],
            )
            .with_context(|| "failed to insert weight reading")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Readings with `start <= recorded_at < end`, oldest first.
    pub async fn get_weight_readings_between(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeightReading>> {
        let collection = collection.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, device_type, device_id, event_type, weight, attributes_json, recorded_at
                 FROM weight_readings
                 WHERE collection = ?1 AND recorded_at >= ?2 AND recorded_at < ?3
                 ORDER BY recorded_at ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![collection, to_micros(&start), to_micros(&end)])?;
            let mut readings = Vec::new();
            while let Some(row) = rows.next()? {
                readings.push(row_to_reading(row)?);
            }

            Ok(readings)
        })
        .await
    }

    pub async fn count_weight_readings(&self, collection: &str) -> Result<u64> {
        let collection = collection.to_string();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM weight_readings WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            to_u64(count, "count")
        })
        .await
    }
}
