use async_trait::async_trait;
use tracing::warn;

use super::dispatcher::AlertNotification;
use crate::error::NotificationError;

/// Best-effort delivery of a fired alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &AlertNotification) -> Result<(), NotificationError>;
}

/// Writes alerts to the log only. Used when no mail credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &AlertNotification) -> Result<(), NotificationError> {
        warn!(
            channel = %alert.channel,
            reading_id = %alert.reading.id,
            temperature = alert.reading.temperature,
            humidity = alert.reading.humidity,
            motion_detected = alert.reading.motion_detected,
            "Alert triggered: {}",
            alert.reason
        );
        Ok(())
    }
}
