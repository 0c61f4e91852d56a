use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backstroke::config::Config;
use backstroke::github::OctocrabClient;
use backstroke::server::{AppState, build_router};
use backstroke::sync::Remote;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backstroke=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::debug!(?config, "Loaded configuration");

    let client = match &config.github_token {
        Some(token) => OctocrabClient::from_token(token.as_str())
            .context("failed to build authenticated GitHub client")?,
        None => {
            tracing::warn!("No GitHub token specified; using anonymous access");
            OctocrabClient::anonymous().context("failed to build GitHub client")?
        }
    };

    if config.webhook_secret.is_none() {
        tracing::warn!("No webhook secret configured; deliveries will not be verified");
    }

    let remote = Remote::new(client, config.sync.request_timeout);
    let app_state = AppState::new(
        remote,
        config.sync.fan_out_options(),
        config.webhook_secret.map(String::into_bytes),
    );
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
