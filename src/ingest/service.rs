use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time;
use tracing::{debug, error, info, warn};

use super::raw::RawReading;
use crate::{
    alerts::{AlertDispatcher, AlertNotification, Notifier},
    db::models::Reading,
    error::{IngestError, NotificationError},
    store::ReadingStore,
};

/// Write path for incoming readings: persist, evaluate alerts, notify.
pub struct IngestionService {
    store: Arc<dyn ReadingStore>,
    dispatcher: Arc<AlertDispatcher>,
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn ReadingStore>,
        dispatcher: Arc<AlertDispatcher>,
        notifier: Arc<dyn Notifier>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            notifier,
            notify_timeout,
        }
    }

    /// Validates `raw`, persists it and, when the dispatcher decides so, sends
    /// one alert.
    ///
    /// The returned reading is durably stored whatever happens to the alert:
    /// notifier failures and timeouts are logged and swallowed.
    pub async fn ingest(&self, raw: RawReading) -> Result<Reading, IngestError> {
        let new = raw.validate()?;

        let reading = self
            .store
            .insert(new)
            .await
            .map_err(IngestError::Persistence)?;

        info!(
            reading_id = %reading.id,
            temperature = reading.temperature,
            humidity = reading.humidity,
            lux = reading.lux,
            motion_detected = reading.motion_detected,
            "Reading persisted"
        );

        if let Some(alert) = self.dispatcher.evaluate(&reading, Utc::now()) {
            self.notify(&alert).await;
        }

        Ok(reading)
    }

    async fn notify(&self, alert: &AlertNotification) {
        info!(channel = %alert.channel, reading_id = %alert.reading.id, "Alert fired");

        let outcome = match time::timeout(self.notify_timeout, self.notifier.send(alert)).await {
            Ok(res) => res,
            Err(_) => Err(NotificationError::Timeout(self.notify_timeout)),
        };

        match outcome {
            Ok(()) => debug!(channel = %alert.channel, "Alert delivered"),
            Err(e @ NotificationError::Timeout(_)) => {
                error!(channel = %alert.channel, error = %e, "Alert delivery timed out");
            }
            Err(e) => {
                warn!(channel = %alert.channel, error = %e, "Alert delivery failed");
            }
        }
    }
}
