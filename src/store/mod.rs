//! Append-only persistence of readings.
//!
//! The service only needs three things from a store: append a reading, list
//! the newest ones, and fetch everything inside a half-open time range.

mod memory;
mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    db::models::{NewReading, Reading},
    error::StoreError,
};

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist `reading` and return it with its assigned id and timestamp.
    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError>;

    /// The `limit` most recent readings, newest first. Readings sharing a
    /// timestamp come out in reverse insertion order.
    async fn latest(&self, limit: u32) -> Result<Vec<Reading>, StoreError>;

    /// All readings with `start <= recorded_at < end`.
    async fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError>;
}
