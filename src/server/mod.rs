//! HTTP server.
//!
//! # Endpoints
//!
//! - `POST /` - Accepts a repository event and syncs the repository's forks,
//!   or the repository itself when it is a fork (see [`webhook_handler`])
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::sync::{FanOutOptions, Remote};

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{UpstreamQuery, WebhookError, webhook_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<G> {
    inner: Arc<AppStateInner<G>>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<G> {
    remote: Remote<G>,

    fan_out: FanOutOptions,

    /// Webhook secret for HMAC-SHA256 signature verification. Deliveries are
    /// not verified when absent.
    webhook_secret: Option<Vec<u8>>,
}

impl<G> AppState<G> {
    pub fn new(remote: Remote<G>, fan_out: FanOutOptions, webhook_secret: Option<Vec<u8>>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                remote,
                fan_out,
                webhook_secret,
            }),
        }
    }

    pub fn remote(&self) -> &Remote<G> {
        &self.inner.remote
    }

    pub fn fan_out_options(&self) -> &FanOutOptions {
        &self.inner.fan_out
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<G>(app_state: AppState<G>) -> axum::Router
where
    G: GitHubInterpreter<Error = GitHubApiError> + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", post(webhook_handler::<G>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
