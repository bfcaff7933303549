use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portman_client::health::default_endpoints;
use portman_client::{Config, HealthPoller, ReqwestTransport};

const USER_AGENT: &str = concat!("portman-status/", env!("CARGO_PKG_VERSION"));

/// Headless status watcher: polls the backend's health endpoints on the
/// configured interval and logs every transition until interrupted.
#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("portman_client={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PORTMAN status watch v{}", env!("CARGO_PKG_VERSION"));
    info!(
        base_url = %config.base_url,
        interval_secs = config.poll_interval.as_secs(),
        "watching backend health"
    );

    let transport = Arc::new(ReqwestTransport::new(USER_AGENT)?);
    let poller = Arc::new(HealthPoller::new(
        &config,
        transport,
        default_endpoints(),
    ));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                cancel.cancel();
            }
        });
    }

    poller.run(cancel).await;

    let final_state = poller.snapshot();
    info!(
        overall = final_state.overall.as_str(),
        issues = final_state.issue_count,
        "{}",
        final_state.summary
    );

    Ok(())
}
