use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use utoipa::OpenApi;

use super::{
    dto::{ReadingDto, ReadingsQuery},
    errors::AppError,
    AppState,
};
use crate::{
    analytics::{AnalyticsWindow, DayComparison},
    ingest::{MotionFlag, NumberField, RawReading},
};

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Store one reading from the device and raise an alert if it warrants one.
#[utoipa::path(
    post,
    path = "/readings",
    request_body = RawReading,
    responses(
        (status = 201, description = "Reading stored", body = ReadingDto),
        (status = 400, description = "Malformed or invalid reading"),
        (status = 500, description = "Reading store failure"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    payload: Result<Json<RawReading>, JsonRejection>,
) -> Result<(StatusCode, Json<ReadingDto>), AppError> {
    let Json(raw) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let reading = state.ingestion.ingest(raw).await?;
    Ok((StatusCode::CREATED, Json(reading.into())))
}

/// Fetch the most recent readings, newest first.
#[utoipa::path(
    get,
    path = "/readings",
    params(ReadingsQuery),
    responses(
        (status = 200, description = "Recent readings", body = Vec<ReadingDto>),
        (status = 400, description = "Invalid limit"),
        (status = 500, description = "Reading store failure"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let rows = state.store.latest(params.limit()?).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Compare today so far with the whole of yesterday.
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Today vs. yesterday", body = DayComparison),
        (status = 500, description = "Reading store failure"),
    ),
    tag = "analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<DayComparison>, AppError> {
    Ok(Json(state.analytics.compare(Utc::now()).await?))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(create_reading, list_readings, get_analytics, health),
    components(schemas(RawReading, MotionFlag, NumberField, ReadingDto, AnalyticsWindow, DayComparison)),
    tags(
        (name = "readings",  description = "Telemetry ingestion and history"),
        (name = "analytics", description = "Day-over-day statistics"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Home Telemetry API",
        version = "0.1.0",
        description = "Ingests environmental readings, raises alerts and reports daily statistics"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
