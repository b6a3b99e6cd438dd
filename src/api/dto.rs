use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{db::models::Reading, error::ValidationError};

pub const DEFAULT_READINGS_LIMIT: u32 = 50;
pub const MAX_READINGS_LIMIT: u32 = 500;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub id: Uuid,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Light intensity in lux
    pub lux: f64,
    pub motion_detected: bool,
    /// When the reading was recorded (server time unless supplied by the device)
    pub timestamp: DateTime<Utc>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            temperature: r.temperature,
            humidity: r.humidity,
            lux: r.lux,
            motion_detected: r.motion_detected,
            timestamp: r.recorded_at,
        }
    }
}

/// Query parameters for `GET /readings`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingsQuery {
    /// Number of readings to return, newest first (1-500, default 50).
    pub limit: Option<u32>,
}

impl ReadingsQuery {
    /// Requested limit, defaulted and bounds-checked.
    pub fn limit(&self) -> Result<u32, ValidationError> {
        match self.limit.unwrap_or(DEFAULT_READINGS_LIMIT) {
            n @ 1..=MAX_READINGS_LIMIT => Ok(n),
            got => Err(ValidationError::Limit {
                got,
                max: MAX_READINGS_LIMIT,
            }),
        }
    }
}
