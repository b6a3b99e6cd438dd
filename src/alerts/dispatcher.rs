use std::{
    fmt,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use crate::db::models::Reading;

/// Alert category. Declaration order is evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    CriticalHeat,
    Motion,
}

impl AlertChannel {
    /// Human-readable label used as the alert headline.
    pub fn reason(self) -> &'static str {
        match self {
            AlertChannel::CriticalHeat => "CRITICAL HEAT DETECTED",
            AlertChannel::Motion => "MOTION DETECTED",
        }
    }
}

impl fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertChannel::CriticalHeat => "critical_heat",
            AlertChannel::Motion => "motion",
        };
        f.write_str(s)
    }
}

/// Thresholds and cooldowns for both channels.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPolicy {
    /// Degrees Celsius; CriticalHeat triggers strictly above this.
    pub heat_threshold: f64,
    pub heat_cooldown: Duration,
    pub motion_cooldown: Duration,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            heat_threshold: 35.0,
            heat_cooldown: Duration::from_secs(10),
            motion_cooldown: Duration::from_secs(5 * 60),
        }
    }
}

/// A positive firing decision. The caller owns delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotification {
    pub channel: AlertChannel,
    pub reading: Reading,
    pub reason: &'static str,
}

#[derive(Debug)]
struct ChannelState {
    cooldown: TimeDelta,
    last_fired_at: Mutex<Option<DateTime<Utc>>>,
}

impl ChannelState {
    fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            last_fired_at: Mutex::new(None),
        }
    }

    /// Check the cooldown and claim the slot in one critical section.
    fn try_fire(&self, now: DateTime<Utc>) -> bool {
        let mut last = self
            .last_fired_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let expired = match *last {
            None => true,
            Some(prev) => now.signed_duration_since(prev) > self.cooldown,
        };
        if expired {
            *last = Some(now);
        }
        expired
    }

    fn last_fired_at(&self) -> Option<DateTime<Utc>> {
        *self
            .last_fired_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self) {
        *self
            .last_fired_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Cooldown-gated alert decision engine.
///
/// Construct once per process and share behind an `Arc`. Each channel has its
/// own lock, so heat and motion decisions never wait on each other. State is
/// in memory only and starts empty after a restart.
#[derive(Debug)]
pub struct AlertDispatcher {
    heat_threshold: f64,
    heat: ChannelState,
    motion: ChannelState,
}

impl AlertDispatcher {
    pub fn new(policy: &AlertPolicy) -> Self {
        Self {
            heat_threshold: policy.heat_threshold,
            heat: ChannelState::new(policy.heat_cooldown),
            motion: ChannelState::new(policy.motion_cooldown),
        }
    }

    /// Decide whether `reading` warrants a notification at `now`.
    ///
    /// CriticalHeat is checked first. Motion is only considered when heat did
    /// not fire, so a reading yields at most one notification. A firing
    /// decision records `now` as the channel's last firing time.
    pub fn evaluate(&self, reading: &Reading, now: DateTime<Utc>) -> Option<AlertNotification> {
        let channel = if reading.temperature > self.heat_threshold && self.heat.try_fire(now) {
            AlertChannel::CriticalHeat
        } else if reading.motion_detected && self.motion.try_fire(now) {
            AlertChannel::Motion
        } else {
            debug!(reading_id = %reading.id, "No alert for reading");
            return None;
        };

        Some(AlertNotification {
            channel,
            reading: reading.clone(),
            reason: channel.reason(),
        })
    }

    /// When `channel` last fired, if ever.
    pub fn last_fired_at(&self, channel: AlertChannel) -> Option<DateTime<Utc>> {
        self.state(channel).last_fired_at()
    }

    /// Forget all firing history.
    pub fn reset(&self) {
        self.heat.reset();
        self.motion.reset();
    }

    fn state(&self, channel: AlertChannel) -> &ChannelState {
        match channel {
            AlertChannel::CriticalHeat => &self.heat,
            AlertChannel::Motion => &self.motion,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn reading(temperature: f64, motion_detected: bool) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            recorded_at: t0(),
            temperature,
            humidity: 50.0,
            lux: 200.0,
            motion_detected,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    fn dispatcher() -> AlertDispatcher {
        AlertDispatcher::new(&AlertPolicy::default())
    }

    fn ms(n: i64) -> TimeDelta {
        TimeDelta::milliseconds(n)
    }

    #[test]
    fn quiet_reading_fires_nothing() {
        let d = dispatcher();
        assert!(d.evaluate(&reading(22.0, false), t0()).is_none());
        assert!(d.last_fired_at(AlertChannel::CriticalHeat).is_none());
        assert!(d.last_fired_at(AlertChannel::Motion).is_none());
    }

    #[test]
    fn threshold_is_exclusive() {
        let d = dispatcher();
        assert!(d.evaluate(&reading(35.0, false), t0()).is_none());
        let alert = d.evaluate(&reading(35.01, false), t0()).unwrap();
        assert_eq!(alert.channel, AlertChannel::CriticalHeat);
        assert_eq!(alert.reason, "CRITICAL HEAT DETECTED");
    }

    #[test]
    fn heat_is_suppressed_within_cooldown_and_fires_after_it() {
        let d = dispatcher();
        let hot = reading(38.0, false);

        assert!(d.evaluate(&hot, t0()).is_some());
        for offset in [1, 500, 5_000, 9_999, 10_000] {
            assert!(
                d.evaluate(&hot, t0() + ms(offset)).is_none(),
                "fired {offset} ms after previous alert"
            );
        }

        let after = t0() + ms(10_001);
        let alert = d.evaluate(&hot, after).unwrap();
        assert_eq!(alert.channel, AlertChannel::CriticalHeat);
        assert_eq!(d.last_fired_at(AlertChannel::CriticalHeat), Some(after));

        assert!(d.evaluate(&hot, after + ms(1)).is_none());
    }

    #[test]
    fn suppressed_evaluations_do_not_extend_the_cooldown() {
        let d = dispatcher();
        let hot = reading(40.0, false);

        d.evaluate(&hot, t0()).unwrap();
        assert!(d.evaluate(&hot, t0() + ms(9_000)).is_none());
        assert_eq!(d.last_fired_at(AlertChannel::CriticalHeat), Some(t0()));
        assert!(d.evaluate(&hot, t0() + ms(10_500)).is_some());
    }

    #[test]
    fn heat_takes_priority_and_leaves_motion_untouched() {
        let d = dispatcher();
        let alert = d.evaluate(&reading(39.0, true), t0()).unwrap();

        assert_eq!(alert.channel, AlertChannel::CriticalHeat);
        assert!(d.last_fired_at(AlertChannel::Motion).is_none());
    }

    #[test]
    fn motion_fires_when_heat_is_cooling_down() {
        let d = dispatcher();
        d.evaluate(&reading(39.0, true), t0()).unwrap();

        let alert = d.evaluate(&reading(39.0, true), t0() + ms(1_000)).unwrap();
        assert_eq!(alert.channel, AlertChannel::Motion);
        assert_eq!(alert.reason, "MOTION DETECTED");
    }

    #[test]
    fn motion_has_its_own_longer_cooldown() {
        let d = dispatcher();
        let moving = reading(21.0, true);

        assert!(d.evaluate(&moving, t0()).is_some());
        assert!(d.evaluate(&moving, t0() + TimeDelta::seconds(60)).is_none());
        assert!(d.evaluate(&moving, t0() + TimeDelta::seconds(300)).is_none());
        assert!(d
            .evaluate(&moving, t0() + TimeDelta::seconds(300) + ms(1))
            .is_some());
    }

    #[test]
    fn motion_cooldown_does_not_block_heat() {
        let d = dispatcher();
        d.evaluate(&reading(21.0, true), t0()).unwrap();

        let alert = d.evaluate(&reading(37.0, false), t0() + ms(1)).unwrap();
        assert_eq!(alert.channel, AlertChannel::CriticalHeat);
    }

    #[test]
    fn clock_going_backwards_does_not_fire() {
        let d = dispatcher();
        d.evaluate(&reading(37.0, false), t0()).unwrap();
        assert!(d
            .evaluate(&reading(37.0, false), t0() - TimeDelta::hours(1))
            .is_none());
    }

    #[test]
    fn custom_policy_is_honoured() {
        let d = AlertDispatcher::new(&AlertPolicy {
            heat_threshold: 28.0,
            heat_cooldown: Duration::from_secs(1),
            motion_cooldown: Duration::from_secs(2),
        });
        let warm = reading(29.0, false);

        assert!(d.evaluate(&warm, t0()).is_some());
        assert!(d.evaluate(&warm, t0() + ms(1_001)).is_some());
    }

    #[test]
    fn reset_clears_history() {
        let d = dispatcher();
        d.evaluate(&reading(37.0, false), t0()).unwrap();
        d.evaluate(&reading(20.0, true), t0()).unwrap();

        d.reset();

        assert!(d.last_fired_at(AlertChannel::CriticalHeat).is_none());
        assert!(d.last_fired_at(AlertChannel::Motion).is_none());
        assert!(d.evaluate(&reading(37.0, false), t0() + ms(1)).is_some());
    }

    #[test]
    fn concurrent_evaluations_fire_once() {
        let d = Arc::new(dispatcher());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let d = Arc::clone(&d);
                thread::spawn(move || d.evaluate(&reading(45.0, false), t0() + ms(i)).is_some())
            })
            .collect();

        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|fired| *fired)
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn channel_display_is_snake_case() {
        assert_eq!(AlertChannel::CriticalHeat.to_string(), "critical_heat");
        assert_eq!(AlertChannel::Motion.to_string(), "motion");
    }
}
