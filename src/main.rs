// Main entry point - Dependency injection, poller and status API setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::application::display_sink::LogSink;
use crate::application::poll_scheduler::{PollHandle, PollScheduler};
use crate::infrastructure::config::{DEFAULT_SETTINGS_FILE, load_app_config};
use crate::infrastructure::reqwest_client::ReqwestConnector;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shelly_panel=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = load_app_config(&settings_path)?;

    // Create the poller (application layer) over the reqwest adapter
    let connector = Arc::new(ReqwestConnector::new(settings.request_timeout()));
    let scheduler = PollScheduler::new(connector, Arc::new(LogSink));
    let handle = scheduler.start(settings.panel());

    let (stop_reload, stop_reload_rx) = watch::channel(false);
    let reloader = tokio::spawn(reload_on_hangup(
        scheduler.clone(),
        handle,
        settings_path,
        stop_reload_rx,
    ));

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        scheduler: scheduler.clone(),
    });
    let router = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind status API on {}", settings.listen_addr))?;
    info!(addr = %settings.listen_addr, "Status API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = stop_reload.send(true);
    let handle = reloader.await.context("Settings reload task failed")?;
    handle.stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Re-read settings on SIGHUP and restart the poller with them until `stop`
/// fires, then hand back the handle of the run that is current. The listen
/// address and request timeout only take effect on process restart.
#[cfg(unix)]
async fn reload_on_hangup(
    scheduler: PollScheduler,
    mut handle: PollHandle,
    settings_path: String,
    mut stop: watch::Receiver<bool>,
) -> PollHandle {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!(error = %e, "Settings reload on SIGHUP unavailable");
            let _ = stop.changed().await;
            return handle;
        }
    };

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            Some(()) = hangup.recv() => match load_app_config(&settings_path) {
                Ok(settings) => {
                    info!(path = %settings_path, "Settings reloaded");
                    handle = scheduler.reconfigure(settings.panel());
                }
                Err(e) => warn!(error = %e, "Settings reload failed, keeping current configuration"),
            },
        }
    }
    handle
}

#[cfg(not(unix))]
async fn reload_on_hangup(
    _scheduler: PollScheduler,
    handle: PollHandle,
    _settings_path: String,
    mut stop: watch::Receiver<bool>,
) -> PollHandle {
    let _ = stop.changed().await;
    handle
}
