//! Webhook endpoint handler.
//!
//! Accepts a delivery describing a repository, routes it (one fork, or every
//! fork), runs the sync to completion and reports the result in the response.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::sync::{FanOutSummary, PipelineOutcome, RouteOutcome, SyncError, route};
use crate::webhooks::{
    EventError, SIGNATURE_HEADER, SignatureError, parse_repository_event, verify_delivery,
};

/// Reply for runs that ended without a proposal and without an error.
const NOTHING_TO_DO: &str =
    "Thanks anyway, but the user either opted out or this isn't an important event.";

#[derive(Debug, Deserialize)]
pub struct UpstreamQuery {
    /// `owner/name` to compare against instead of the fork's parent.
    pub upstream: Option<String>,
}

/// Errors that end a delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::Signature(e) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))).into_response()
            }
            WebhookError::Event(e) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
            }
            WebhookError::Sync(e) => sync_error_response(&e),
        }
    }
}

/// Domain errors are a definitive answer; transient ones invite re-delivery.
fn sync_error_status(e: &SyncError) -> StatusCode {
    let kind = e.kind();
    if kind.is_domain() {
        StatusCode::OK
    } else if kind.is_transient() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn sync_error_response(e: &SyncError) -> Response {
    let body = json!({
        "error": e.to_string(),
        "kind": e.kind().as_str(),
        "retryable": e.is_transient(),
    });
    (sync_error_status(e), Json(body)).into_response()
}

fn fan_out_response(summary: &FanOutSummary) -> Response {
    let failures: Vec<_> = summary
        .failures
        .iter()
        .map(|(fork, e)| {
            json!({
                "repository": fork.to_string(),
                "error": e.to_string(),
                "kind": e.kind().as_str(),
            })
        })
        .collect();

    Json(json!({
        "ok": true,
        "detail": summary.message(),
        "attempted": summary.attempted,
        "created": summary.created,
        "failures": failures,
    }))
    .into_response()
}

fn pipeline_response(full_name: &str, outcome: &PipelineOutcome) -> Response {
    match outcome {
        PipelineOutcome::ProposalCreated(pr) => Json(json!({
            "ok": true,
            "pull_request": pr.number.0,
        }))
        .into_response(),
        PipelineOutcome::ProposalAlreadyExists { existing } => Json(json!({
            "ok": true,
            "detail": format!("A Backstroke pull request already exists on {}", full_name),
            "pull_request": existing.0,
        }))
        .into_response(),
        PipelineOutcome::Skipped(_) | PipelineOutcome::NotDiverged => {
            Json(json!({ "ok": true, "detail": NOTHING_TO_DO })).into_response()
        }
        PipelineOutcome::Failed(e) => sync_error_response(e),
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST, path `/`
/// - Query: optional `upstream=owner/name`
/// - Header: `X-Hub-Signature-256`, required only when a secret is configured
/// - Body: JSON with a `repository` object carrying `full_name` and
///   `default_branch`
///
/// # Response
///
/// - 200 with `{"ok": true, ...}` when the run finished
/// - 200 with `{"error", "kind", "retryable"}` for domain errors (not a fork)
/// - 400 for a malformed body, 401 for a bad signature
/// - 502 for transient GitHub failures, 500 for other failures
pub async fn webhook_handler<G>(
    State(app_state): State<AppState<G>>,
    Query(query): Query<UpstreamQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Send + Sync + 'static,
{
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = verify_delivery(app_state.webhook_secret(), signature, &body) {
        warn!(error = %e, "Rejecting webhook delivery");
        return Err(e.into());
    }

    let repo = parse_repository_event(&body)?;
    let upstream = query.upstream.as_deref();
    debug!(repo = %repo.full_name, fork = repo.is_fork, upstream, "Received webhook");

    let outcome = route(
        app_state.remote(),
        &repo,
        upstream,
        app_state.fan_out_options(),
    )
    .await?;

    Ok(match &outcome {
        RouteOutcome::SingleFork(outcome) => pipeline_response(&repo.full_name, outcome),
        RouteOutcome::FanOut(summary) => fan_out_response(summary),
    })
}
