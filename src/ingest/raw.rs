use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db::models::NewReading, error::ValidationError};

// ---------------------------------------------------------------------------
// MotionFlag
//
// Devices report motion as a JSON boolean, as 0/1, or occasionally as a
// string. `untagged` tries each variant in order, so Bool must come first.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MotionFlag {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl MotionFlag {
    pub fn to_bool(&self) -> Result<bool, ValidationError> {
        match self {
            MotionFlag::Bool(v) => Ok(*v),
            MotionFlag::Number(n) if *n == 1.0 => Ok(true),
            MotionFlag::Number(n) if *n == 0.0 => Ok(false),
            MotionFlag::Number(n) => Err(ValidationError::MotionFlag(n.to_string())),
            MotionFlag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ValidationError::MotionFlag(s.clone())),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// NumberField
//
// Some firmware builds quote their numbers (`"temp": "36.5"`).
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

impl From<f64> for NumberField {
    fn from(v: f64) -> Self {
        NumberField::Number(v)
    }
}

impl NumberField {
    /// Finite value, or `None` for a blank string.
    fn to_f64(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        let v = match self {
            NumberField::Number(n) => *n,
            NumberField::Text(s) if s.trim().is_empty() => return Ok(None),
            NumberField::Text(s) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::NotANumber {
                        field,
                        value: s.clone(),
                    })?
            }
        };
        if v.is_finite() {
            Ok(Some(v))
        } else {
            Err(ValidationError::NonFinite { field })
        }
    }
}

/// Request body for `POST /readings`.
///
/// Missing, `null` or blank numeric fields default to `0`, a missing motion
/// flag to `false`. Numbers may arrive as JSON numbers or numeric strings.
/// The short field names sent by the device firmware are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RawReading {
    /// Degrees Celsius
    #[serde(default, alias = "temp")]
    pub temperature: Option<NumberField>,
    /// Relative humidity percentage
    #[serde(default, alias = "hum")]
    pub humidity: Option<NumberField>,
    /// Light intensity in lux
    #[serde(default)]
    pub lux: Option<NumberField>,
    #[serde(default, alias = "motion", alias = "motionDetected")]
    pub motion_detected: Option<MotionFlag>,
    /// Device-side timestamp (RFC3339). Server time is used when absent.
    #[serde(default, alias = "timestamp")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RawReading {
    /// Normalise into a [`NewReading`], rejecting unparsable or non-finite
    /// numbers and unrecognised motion flags.
    pub fn validate(self) -> Result<NewReading, ValidationError> {
        Ok(NewReading {
            recorded_at: self.recorded_at,
            temperature: number("temperature", self.temperature.as_ref())?,
            humidity: number("humidity", self.humidity.as_ref())?,
            lux: number("lux", self.lux.as_ref())?,
            motion_detected: match &self.motion_detected {
                Some(flag) => flag.to_bool()?,
                None => false,
            },
        })
    }
}

fn number(field: &'static str, value: Option<&NumberField>) -> Result<f64, ValidationError> {
    match value {
        None => Ok(0.0),
        Some(v) => Ok(v.to_f64(field)?.unwrap_or(0.0)),
    }
}
