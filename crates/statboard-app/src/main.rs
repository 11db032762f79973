// statboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Build the statistics client
// 4. Create mpsc channels
// 5. Spawn the host bridge task
// 6. Spawn the controller loop
// 7. Wait for Ctrl+C, then shut down

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use statboard_app::client::HttpStatsSource;
use statboard_app::config;
use statboard_app::controller::{self, ViewController};
use statboard_app::ws_server::{self, WsPage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("statboard starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, timeout={}s, overlap={:?}",
        config.api.base_url, config.api.timeout_secs, config.view.overlap
    );

    let source =
        HttpStatsSource::from_config(&config.api).context("failed to build statistics client")?;

    let (ws_tx, ws_rx) = mpsc::channel(256);
    let (fetch_tx, fetch_rx) = mpsc::channel(64);
    let (page_tx, page_rx) = mpsc::channel(256);

    let controller = ViewController::new(
        config.view.clone(),
        Arc::new(source),
        WsPage::new(page_tx),
        fetch_tx,
    );

    let ws_port = config.websocket.port;
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_server::run(ws_port, ws_tx, page_rx).await {
            error!("Host bridge error on port {}: {}", ws_port, e);
        }
    });

    let app_handle = tokio::spawn(async move {
        if let Err(e) = controller::run(ws_rx, fetch_rx, controller).await {
            error!("Controller loop error: {}", e);
        }
    });

    info!("Ready. Host page should connect to ws://127.0.0.1:{}", ws_port);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutdown requested");

    // Aborting the bridge drops its event sender, which ends the controller loop.
    ws_handle.abort();
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    info!("statboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to `logs/statboard.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("statboard.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("statboard=info,statboard_app=info,statboard_core=info,warn")
    });

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
