use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use home_telemetry_service::{
    alerts::{AlertDispatcher, EmailNotifier, LogNotifier, Notifier},
    analytics::AnalyticsService,
    api::{self, AppState},
    config::Config,
    db,
    ingest::IngestionService,
    store::{MemoryReadingStore, PgReadingStore, ReadingStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn ReadingStore> = match &config.database_url {
        Some(url) => Arc::new(PgReadingStore::new(db::connect(url).await?)),
        None => {
            warn!("DATABASE_URL not set; readings are kept in memory and lost on restart");
            Arc::new(MemoryReadingStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.mail {
        Some(mail) => {
            info!(recipients = mail.to.len(), "E-mail alerts enabled");
            Arc::new(EmailNotifier::new(mail))
        }
        None => {
            warn!("RESEND_API_KEY not set; alerts are only logged");
            Arc::new(LogNotifier)
        }
    };

    // Cooldown state lives here for the lifetime of the process.
    let dispatcher = Arc::new(AlertDispatcher::new(&config.alerts));
    info!(
        heat_threshold = config.alerts.heat_threshold,
        heat_cooldown_secs = config.alerts.heat_cooldown.as_secs(),
        motion_cooldown_secs = config.alerts.motion_cooldown.as_secs(),
        "Alert dispatcher ready"
    );

    let state = AppState {
        store: store.clone(),
        ingestion: Arc::new(IngestionService::new(
            store.clone(),
            dispatcher,
            notifier,
            config.notify_timeout,
        )),
        analytics: Arc::new(AnalyticsService::new(store, config.reporting_zone)),
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
