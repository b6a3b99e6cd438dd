use std::time::Duration;

use thiserror::Error;

/// Failure of the reading store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("reading store unavailable: {0}")]
    Unavailable(String),
}

/// A reading or query parameter rejected at the ingestion boundary.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("motion flag must be a boolean, 0/1 or \"true\"/\"false\", got {0:?}")]
    MotionFlag(String),
    #[error("limit must be between 1 and {max}, got {got}")]
    Limit { got: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to persist reading: {0}")]
    Persistence(#[source] StoreError),
}

/// Delivery failure of an alert. Logged by the caller, never surfaced.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notifier rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("notifier timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
#[error("failed to aggregate readings: {0}")]
pub struct AggregationError(#[from] pub StoreError);
