//! Event routing: one fork, or every fork.

use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::RepositoryRef;

use super::error::SyncError;
use super::fanout::{FanOutOptions, FanOutSummary, fan_out};
use super::pipeline::{PipelineOutcome, run_pipeline};
use super::remote::Remote;

/// Where an event is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event's repository is brought up to date with its upstream.
    SingleFork,

    /// Every fork of the event's repository is brought up to date with it.
    FanOut,
}

/// A fork, or any event carrying an upstream, goes to the single-fork
/// pipeline. Anything else is treated as an upstream whose forks need
/// checking.
///
/// Any non-empty override counts here, even one [`super::resolve`] would
/// ignore.
pub fn dispatch(repo: &RepositoryRef, upstream_override: Option<&str>) -> Dispatch {
    let has_override = upstream_override.is_some_and(|s| !s.is_empty());
    if repo.is_fork || has_override {
        Dispatch::SingleFork
    } else {
        Dispatch::FanOut
    }
}

#[derive(Debug)]
pub enum RouteOutcome {
    SingleFork(PipelineOutcome),
    FanOut(FanOutSummary),
}

/// Routes an event about `repo` and runs whatever it was routed to.
///
/// Fails only when a fan-out cannot list forks. Single-fork failures are
/// reported through [`PipelineOutcome::Failed`].
#[instrument(skip(remote, repo, options), fields(repo = %repo.full_name))]
pub async fn route<G>(
    remote: &Remote<G>,
    repo: &RepositoryRef,
    upstream_override: Option<&str>,
    options: &FanOutOptions,
) -> Result<RouteOutcome, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    match dispatch(repo, upstream_override) {
        Dispatch::SingleFork => {
            tracing::info!(
                branch = %repo.default_branch,
                upstream = upstream_override.unwrap_or("parent"),
                "Merging upstream into repository"
            );
            let outcome = run_pipeline(remote, repo, upstream_override).await;
            Ok(RouteOutcome::SingleFork(outcome))
        }
        Dispatch::FanOut => {
            tracing::info!(branch = %repo.default_branch, "Merging repository into all forks");
            let summary = fan_out(remote, repo, options).await?;
            Ok(RouteOutcome::FanOut(summary))
        }
    }
}
