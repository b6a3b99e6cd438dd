use std::{str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::FixedOffset;

use crate::{alerts::AlertPolicy, analytics::ReportingZone};

/// Credentials and addressing for the transactional e-mail API.
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. Readings live in memory when unset.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub alerts: AlertPolicy,
    /// Alerts are only logged when unset.
    pub mail: Option<MailConfig>,
    pub notify_timeout: Duration,
    pub reporting_zone: ReportingZone,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let heat_threshold: f64 = env.parse_or("HEAT_THRESHOLD_C", 35.0)?;
        if !heat_threshold.is_finite() {
            bail!("HEAT_THRESHOLD_C must be a finite number");
        }

        Ok(Self {
            database_url: env.get("DATABASE_URL"),
            server_host: env.get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            server_port: env.parse_or("SERVER_PORT", 8080)?,
            alerts: AlertPolicy {
                heat_threshold,
                heat_cooldown: Duration::from_secs(env.parse_or("HEAT_COOLDOWN_SECS", 10)?),
                motion_cooldown: Duration::from_secs(env.parse_or("MOTION_COOLDOWN_SECS", 300)?),
            },
            mail: mail_config(&env)?,
            notify_timeout: Duration::from_secs(env.parse_or("NOTIFY_TIMEOUT_SECS", 10)?),
            reporting_zone: match env.get("REPORTING_UTC_OFFSET") {
                Some(raw) => parse_reporting_zone(&raw)?,
                None => ReportingZone::Local,
            },
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Trimmed value, with empty strings treated as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("missing required env var: {key}"))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{key} has an invalid value: {raw:?}")),
            None => Ok(default),
        }
    }
}

fn mail_config<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Option<MailConfig>> {
    let Some(api_key) = env.get("RESEND_API_KEY") else {
        return Ok(None);
    };

    let to = parse_recipients(&env.required("ALERT_EMAIL_TO")?);
    if to.is_empty() {
        bail!("ALERT_EMAIL_TO must list at least one recipient");
    }

    Ok(Some(MailConfig {
        api_url: env
            .get("MAIL_API_URL")
            .unwrap_or_else(|| "https://api.resend.com".to_owned()),
        api_key,
        from: env
            .get("ALERT_EMAIL_FROM")
            .unwrap_or_else(|| "onboarding@resend.dev".to_owned()),
        to,
    }))
}

/// Parse `"a@x.com, b@y.com"` into a list of addresses.
fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a UTC offset such as `+02:00` or `-0530`.
fn parse_reporting_zone(raw: &str) -> Result<ReportingZone> {
    let offset = raw
        .parse::<FixedOffset>()
        .with_context(|| format!("REPORTING_UTC_OFFSET must look like +02:00, got {raw:?}"))?;
    Ok(ReportingZone::Fixed(offset))
}
