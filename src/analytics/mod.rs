//! Same-day vs. previous-day comparison of stored readings.
//!
//! Computed fresh on every request from two range queries. The queries are
//! not snapshot-consistent with each other.

use std::sync::Arc;

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{db::models::Reading, error::AggregationError, store::ReadingStore};

/// Aggregates over one half-open time window. All zero when the window is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsWindow {
    /// Mean temperature in degrees Celsius
    pub average_temperature: f64,
    /// Highest temperature in degrees Celsius
    pub max_temperature: f64,
    /// Number of readings with motion detected
    pub motion_event_count: u64,
}

impl AnalyticsWindow {
    pub fn from_readings(readings: &[Reading]) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let (sum, max, motion) = readings.iter().fold(
            (0.0_f64, f64::NEG_INFINITY, 0_u64),
            |(sum, max, motion), r| {
                (
                    sum + r.temperature,
                    max.max(r.temperature),
                    motion + u64::from(r.motion_detected),
                )
            },
        );

        Self {
            average_temperature: sum / readings.len() as f64,
            max_temperature: max,
            motion_event_count: motion,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct DayComparison {
    /// From local midnight until now
    pub today: AnalyticsWindow,
    /// The whole previous local calendar day
    pub yesterday: AnalyticsWindow,
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Time zone whose midnight separates analytics days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingZone {
    /// The host's local zone, DST included.
    Local,
    Fixed(FixedOffset),
}

impl ReportingZone {
    pub fn start_of_day(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ReportingZone::Local => local_midnight(t, &Local),
            ReportingZone::Fixed(offset) => local_midnight(t, offset),
        }
    }

    /// `(today, yesterday)` windows relative to `now`.
    pub fn day_windows(&self, now: DateTime<Utc>) -> (TimeWindow, TimeWindow) {
        let today_start = self.start_of_day(now);
        let yesterday_start = self.start_of_day(today_start - TimeDelta::seconds(1));
        (
            TimeWindow {
                start: today_start,
                end: now,
            },
            TimeWindow {
                start: yesterday_start,
                end: today_start,
            },
        )
    }
}

/// Midnight of the local calendar day containing `t`, as a UTC instant.
///
/// An ambiguous midnight resolves to the earlier instant. A midnight skipped
/// by a DST jump falls back to the offset in effect at `t`.
fn local_midnight<Tz: TimeZone>(t: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let local = t.with_timezone(tz);
    let midnight = local.date_naive().and_time(NaiveTime::MIN);
    resolve_midnight(
        tz.from_local_datetime(&midnight),
        midnight,
        local.offset().fix(),
    )
}

fn resolve_midnight<Tz: TimeZone>(
    resolved: LocalResult<DateTime<Tz>>,
    midnight: NaiveDateTime,
    current: FixedOffset,
) -> DateTime<Utc> {
    match resolved {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let offset = TimeDelta::seconds(i64::from(current.local_minus_utc()));
            Utc.from_utc_datetime(&(midnight - offset))
        }
    }
}

pub struct AnalyticsService {
    store: Arc<dyn ReadingStore>,
    zone: ReportingZone,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn ReadingStore>, zone: ReportingZone) -> Self {
        Self { store, zone }
    }

    /// Compare today so far against the whole of yesterday.
    pub async fn compare(&self, now: DateTime<Utc>) -> Result<DayComparison, AggregationError> {
        let (today, yesterday) = self.zone.day_windows(now);
        debug!(
            today_start = %today.start,
            yesterday_start = %yesterday.start,
            "Computing day comparison"
        );

        let today = self.aggregate(today).await?;
        let yesterday = self.aggregate(yesterday).await?;

        Ok(DayComparison { today, yesterday })
    }

    async fn aggregate(&self, window: TimeWindow) -> Result<AnalyticsWindow, AggregationError> {
        let readings = self.store.between(window.start, window.end).await?;
        Ok(AnalyticsWindow::from_readings(&readings))
    }
}
