//! Alert delivery through a Resend-compatible transactional e-mail API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::{dispatcher::AlertNotification, notifier::Notifier};
use crate::{config::MailConfig, error::NotificationError};

const SUBJECT: &str = "Smart Home Critical Alert";

#[derive(Debug, Clone)]
pub struct EmailNotifier {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    api_url: String,
    api_key: String,
    from: String,
    to: Vec<String>,
}

/// Body of `POST {api_url}/emails`.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: String,
}

impl EmailNotifier {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                api_url: config.api_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                from: config.from.clone(),
                to: config.to.clone(),
            }),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, alert: &AlertNotification) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.inner.api_url);
        debug!(url = %url, channel = %alert.channel, "Sending alert e-mail");

        let body = SendEmailRequest {
            from: &self.inner.from,
            to: &self.inner.to,
            subject: SUBJECT,
            html: render_html(alert),
        };

        let resp = self
            .inner
            .http
            .post(&url)
            .bearer_auth(&self.inner.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(channel = %alert.channel, recipients = self.inner.to.len(), "Alert e-mail sent");
        Ok(())
    }
}

fn render_html(alert: &AlertNotification) -> String {
    let r = &alert.reading;
    let motion = if r.motion_detected { "DETECTED" } else { "SECURE" };
    format!(
        concat!(
            r#"<div style="font-family: sans-serif; padding: 20px; border: 1px solid #eee; border-radius: 10px;">"#,
            r#"<h2 style="color: #e11d48;">Alert: {reason}</h2>"#,
            "<p><strong>Temperature:</strong> {temp:.1}°C</p>",
            "<p><strong>Humidity:</strong> {hum:.1}%</p>",
            "<p><strong>Light:</strong> {lux:.0} lx</p>",
            "<p><strong>Motion Status:</strong> {motion}</p>",
            "<hr />",
            r#"<p style="font-size: 10px; color: #666;">Recorded at {at}. Automated alert from your home telemetry service.</p>"#,
            "</div>"
        ),
        reason = alert.reason,
        temp = r.temperature,
        hum = r.humidity,
        lux = r.lux,
        motion = motion,
        at = r.recorded_at.to_rfc3339(),
    )
}
