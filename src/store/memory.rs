use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ReadingStore;
use crate::{
    db::models::{NewReading, Reading},
    error::StoreError,
};

/// Process-local reading store, used when no database is configured.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Readings are kept in insertion order; nothing is ever evicted.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of readings stored so far.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let reading = Reading {
            id: Uuid::new_v4(),
            recorded_at: reading.recorded_at.unwrap_or_else(Utc::now),
            temperature: reading.temperature,
            humidity: reading.humidity,
            lux: reading.lux,
            motion_detected: reading.motion_detected,
        };
        self.inner.write().await.push(reading.clone());
        Ok(reading)
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let guard = self.inner.read().await;
        // Later insertions win ties on recorded_at; sort_by is stable.
        let mut rows: Vec<Reading> = guard.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| r.recorded_at >= start && r.recorded_at < end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn new_reading(temperature: f64, recorded_at: Option<DateTime<Utc>>) -> NewReading {
        NewReading {
            recorded_at,
            temperature,
            humidity: 40.0,
            lux: 120.0,
            motion_detected: false,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemoryReadingStore::new();
        assert!(store.latest(50).await.unwrap().is_empty());
        assert!(store.between(at(0, 0), at(23, 0)).await.unwrap().is_empty());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryReadingStore::new();
        let before = Utc::now();
        let r = store.insert(new_reading(21.5, None)).await.unwrap();

        assert!(r.recorded_at >= before);
        assert_eq!(r.temperature, 21.5);
        assert_ne!(r.id, Uuid::nil());
    }

    #[tokio::test]
    async fn insert_keeps_supplied_timestamp() {
        let store = MemoryReadingStore::new();
        let r = store.insert(new_reading(21.5, Some(at(8, 30)))).await.unwrap();
        assert_eq!(r.recorded_at, at(8, 30));
    }

    #[tokio::test]
    async fn latest_is_newest_first_and_limited() {
        let store = MemoryReadingStore::new();
        store.insert(new_reading(1.0, Some(at(8, 0)))).await.unwrap();
        store.insert(new_reading(3.0, Some(at(10, 0)))).await.unwrap();
        store.insert(new_reading(2.0, Some(at(9, 0)))).await.unwrap();

        let rows = store.latest(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temperature, 3.0);
        assert_eq!(rows[1].temperature, 2.0);
    }

    #[tokio::test]
    async fn latest_breaks_timestamp_ties_by_insertion_order() {
        let store = MemoryReadingStore::new();
        store.insert(new_reading(1.0, Some(at(8, 0)))).await.unwrap();
        store.insert(new_reading(2.0, Some(at(8, 0)))).await.unwrap();

        let rows = store.latest(10).await.unwrap();
        assert_eq!(rows[0].temperature, 2.0);
        assert_eq!(rows[1].temperature, 1.0);
    }

    #[tokio::test]
    async fn between_is_half_open() {
        let store = MemoryReadingStore::new();
        store.insert(new_reading(1.0, Some(at(8, 0)))).await.unwrap();
        store.insert(new_reading(2.0, Some(at(9, 0)))).await.unwrap();
        store.insert(new_reading(3.0, Some(at(10, 0)))).await.unwrap();

        let rows = store.between(at(8, 0), at(10, 0)).await.unwrap();
        let temps: Vec<f64> = rows.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![1.0, 2.0]);

        let rows = store
            .between(at(10, 0) - Duration::nanoseconds(1), at(10, 0))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryReadingStore::new();
        let clone = store.clone();

        store.insert(new_reading(19.0, None)).await.unwrap();

        assert_eq!(clone.len().await, 1);
        assert_eq!(clone.latest(1).await.unwrap()[0].temperature, 19.0);
    }
}
