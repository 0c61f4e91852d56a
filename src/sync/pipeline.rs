//! The single-fork pipeline: opt-out check, divergence check, proposal.
//!
//! Steps run strictly in order, and each can end the run:
//!
//! ```text
//! CheckOptOut ──opted out──▶ Skipped
//!     │
//! CheckDivergence ──same head──▶ NotDiverged
//!     │
//! ProposeUpdate ──▶ ProposalCreated | ProposalAlreadyExists
//! ```
//!
//! A failure at any step ends the run as [`PipelineOutcome::Failed`].

use std::fmt;

use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::{PrNumber, ProposalRef, RepositoryRef};

use super::divergence::detect;
use super::error::SyncError;
use super::optout::has_opted_out;
use super::proposer::{ProposalOutcome, ensure_proposal};
use super::remote::Remote;

/// Why a repository was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The owner labelled a pull request with `optout`.
    OptedOut,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OptedOut => f.write_str("opted out"),
        }
    }
}

/// The result of one pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    Skipped(SkipReason),
    NotDiverged,
    ProposalCreated(ProposalRef),
    ProposalAlreadyExists { existing: PrNumber },
    Failed(SyncError),
}

impl PipelineOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, PipelineOutcome::ProposalCreated(_))
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            PipelineOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs the pipeline for `repo`.
///
/// `repo` only needs an owner and name: the repository is re-fetched for the
/// divergence check, so a fork-listing entry or a webhook payload will do.
#[instrument(skip(remote, repo), fields(repo = %repo.full_name))]
pub async fn run_pipeline<G>(
    remote: &Remote<G>,
    repo: &RepositoryRef,
    upstream_override: Option<&str>,
) -> PipelineOutcome
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    match try_run(remote, repo, upstream_override).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, kind = %e.kind(), "Pipeline failed");
            PipelineOutcome::Failed(e)
        }
    }
}

async fn try_run<G>(
    remote: &Remote<G>,
    repo: &RepositoryRef,
    upstream_override: Option<&str>,
) -> Result<PipelineOutcome, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let id = repo.id();

    if has_opted_out(remote, &id).await? {
        tracing::info!("Repository opted out");
        return Ok(PipelineOutcome::Skipped(SkipReason::OptedOut));
    }

    let divergence = detect(remote, &id, upstream_override).await?;
    if !divergence.diverged {
        tracing::info!("Fork and upstream have not diverged");
        return Ok(PipelineOutcome::NotDiverged);
    }

    tracing::info!(
        base_sha = %divergence.base_sha.short(),
        upstream_sha = %divergence.upstream_sha.short(),
        "Fork has diverged from upstream"
    );

    match ensure_proposal(remote, &divergence.repo, &divergence.upstream_sha).await? {
        ProposalOutcome::Created(created) => Ok(PipelineOutcome::ProposalCreated(created)),
        ProposalOutcome::AlreadyExists { existing } => {
            Ok(PipelineOutcome::ProposalAlreadyExists { existing })
        }
    }
}
