//! Fan-out: running the pipeline across every fork of a repository.

use futures::stream::{self, StreamExt};
use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::{RepoId, RepositoryRef};

use super::error::SyncError;
use super::pipeline::{PipelineOutcome, run_pipeline};
use super::remote::Remote;

/// Default number of forks evaluated at once.
pub const DEFAULT_FAN_OUT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct FanOutOptions {
    /// Maximum number of fork pipelines in flight. Zero is treated as one.
    pub concurrency: usize,
}

impl Default for FanOutOptions {
    fn default() -> Self {
        FanOutOptions {
            concurrency: DEFAULT_FAN_OUT_CONCURRENCY,
        }
    }
}

/// Aggregated outcomes of a fan-out.
#[derive(Debug, Default)]
pub struct FanOutSummary {
    /// Forks the listing described completely enough to evaluate.
    pub attempted: usize,
    pub created: usize,
    pub not_diverged: usize,
    pub already_exists: usize,
    pub skipped: usize,
    /// Failed forks, in fork-listing order.
    pub failures: Vec<(RepoId, SyncError)>,
}

impl FanOutSummary {
    fn record(&mut self, fork: RepoId, outcome: PipelineOutcome) {
        self.attempted += 1;
        match outcome {
            PipelineOutcome::ProposalCreated(_) => self.created += 1,
            PipelineOutcome::NotDiverged => self.not_diverged += 1,
            PipelineOutcome::ProposalAlreadyExists { .. } => self.already_exists += 1,
            PipelineOutcome::Skipped(_) => self.skipped += 1,
            PipelineOutcome::Failed(e) => self.failures.push((fork, e)),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Opened {} pull requests on forks of this repository.",
            self.created
        )
    }
}

/// Runs the pipeline against every fork of `repo`.
///
/// Forks are evaluated concurrently, at most `options.concurrency` at a time;
/// a slow fork holds only its own slot. A fork whose pipeline fails is
/// recorded in the summary and does not affect the others. Only a failure to
/// list the forks fails the whole call.
#[instrument(skip(remote, repo, options), fields(repo = %repo.full_name, concurrency = options.concurrency))]
pub async fn fan_out<G>(
    remote: &Remote<G>,
    repo: &RepositoryRef,
    options: &FanOutOptions,
) -> Result<FanOutSummary, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let forks = remote.list_forks(&repo.id()).await?;
    tracing::info!(forks = forks.len(), "Checking forks");

    // Completion order is arbitrary; the index restores listing order
    let mut outcomes: Vec<(usize, RepoId, PipelineOutcome)> =
        stream::iter(forks.into_iter().enumerate())
            .map(|(index, fork)| async move {
                let outcome = run_pipeline(remote, &fork, None).await;
                (index, fork.id(), outcome)
            })
            .buffer_unordered(options.concurrency.max(1))
            .collect()
            .await;
    outcomes.sort_unstable_by_key(|(index, ..)| *index);

    let mut summary = FanOutSummary::default();
    for (_, fork, outcome) in outcomes {
        summary.record(fork, outcome);
    }

    tracing::info!(
        attempted = summary.attempted,
        created = summary.created,
        failed = summary.failures.len(),
        "Fan-out complete"
    );
    Ok(summary)
}
