use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::ReadingStore;
use crate::{
    db::models::{NewReading, Reading},
    error::StoreError,
};

#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let row = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO readings
                (recorded_at, temperature, humidity, lux, motion_detected)
            VALUES (COALESCE($1, now()), $2, $3, $4, $5)
            RETURNING id, recorded_at, temperature, humidity, lux, motion_detected
            "#,
        )
        .bind(reading.recorded_at)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.lux)
        .bind(reading.motion_detected)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, recorded_at, temperature, humidity, lux, motion_detected
            FROM readings
            ORDER BY recorded_at DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, recorded_at, temperature, humidity, lux, motion_detected
            FROM readings
            WHERE recorded_at >= $1
              AND recorded_at <  $2
            ORDER BY recorded_at ASC, seq ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests (need a live PostgreSQL via DATABASE_URL)
// ---------------------------------------------------------------------------
