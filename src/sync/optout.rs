//! Opt-out detection.
//!
//! A fork owner opts out of update proposals by labelling any pull request on
//! their fork with `optout`.

use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::RepoId;

use super::error::SyncError;
use super::remote::Remote;

/// The label that marks a repository as opted out.
pub const OPT_OUT_LABEL: &str = "optout";

/// The issue search that finds opt-out markers on `repo`.
pub fn opt_out_query(repo: &RepoId) -> String {
    format!("repo:{}/{} is:pr label:{}", repo.owner, repo.name, OPT_OUT_LABEL)
}

/// Whether the owner of `repo` has opted out of update proposals.
///
/// A search failure is returned as an error rather than read as "not opted
/// out".
#[instrument(skip(remote), fields(repo = %repo))]
pub async fn has_opted_out<G>(remote: &Remote<G>, repo: &RepoId) -> Result<bool, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let matches = remote.search_issue_count(&opt_out_query(repo)).await?;
    Ok(matches > 0)
}
