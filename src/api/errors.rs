use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::{AggregationError, IngestError, StoreError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    /// Request body could not be read as a reading.
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("failed to read readings: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::Ingest(IngestError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Ingest(IngestError::Persistence(_))
            | AppError::Store(_)
            | AppError::Aggregation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let e = AppError::from(IngestError::Validation(ValidationError::NonFinite {
            field: "temperature",
        }));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "temperature must be a finite number");
    }

    #[test]
    fn bad_limit_maps_to_400() {
        let e = AppError::from(ValidationError::Limit { got: 0, max: 500 });
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_map_to_500() {
        let e = AppError::from(IngestError::Persistence(StoreError::Unavailable("x".into())));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e = AppError::from(AggregationError(StoreError::Unavailable("x".into())));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e = AppError::from(StoreError::Unavailable("offline".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.to_string(), "failed to read readings: reading store unavailable: offline");
    }
}
