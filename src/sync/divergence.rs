//! Divergence detection between a fork and its upstream.

use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::{DivergenceResult, RepoId};

use super::error::SyncError;
use super::remote::Remote;
use super::upstream::{is_valid_override, resolve};

/// Compares the head of `fork`'s default branch with its upstream's.
///
/// The repository is fetched fresh. Without a valid `upstream_override`, a
/// repository with no parent is rejected with [`SyncError::NotAFork`]. Both
/// branch heads are fetched concurrently; if either fetch fails, so does the
/// detection.
#[instrument(skip(remote), fields(fork = %fork))]
pub async fn detect<G>(
    remote: &Remote<G>,
    fork: &RepoId,
    upstream_override: Option<&str>,
) -> Result<DivergenceResult, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let repo = remote.get_repository(fork).await?;

    let has_override = is_valid_override(upstream_override);
    if !has_override && repo.parent.is_none() {
        return Err(SyncError::NotAFork(repo.id()));
    }

    let target = resolve(&repo, upstream_override);
    let upstream_branch = match &repo.parent {
        Some(parent) if parent.id() == target => parent.default_branch.clone(),
        _ => remote.get_repository(&target).await?.default_branch,
    };

    let (base, upstream) = tokio::try_join!(
        remote.get_branch(fork, &repo.default_branch),
        remote.get_branch(&target, &upstream_branch),
    )?;

    let result = DivergenceResult::compare(repo, base, upstream);
    tracing::debug!(
        upstream = %target,
        base_sha = %result.base_sha.short(),
        upstream_sha = %result.upstream_sha.short(),
        diverged = result.diverged,
        "Compared branch heads"
    );
    Ok(result)
}
