use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted telemetry sample. Immutable once stored.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Light intensity in lux
    pub lux: f64,
    pub motion_detected: bool,
}

/// A validated reading that has not been stored yet.
///
/// `recorded_at` is `None` unless the device supplied its own timestamp; the
/// store assigns the current time in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub recorded_at: Option<DateTime<Utc>>,
    pub temperature: f64,
    pub humidity: f64,
    pub lux: f64,
    pub motion_detected: bool,
}
