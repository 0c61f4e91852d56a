//! Update proposals: opening the pull request that carries upstream changes
//! into a fork, at most once per upstream head.

use tracing::instrument;

use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::{PrNumber, ProposalIntent, ProposalRef, RepositoryRef, Sha};

use super::error::SyncError;
use super::remote::Remote;

/// The result of a proposal attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalOutcome {
    Created(ProposalRef),

    /// An open proposal already carries the upstream head.
    AlreadyExists { existing: PrNumber },
}

/// Opens a pull request merging `repo`'s parent default branch into `repo`'s.
///
/// Open pull requests with the same head are checked first: if one already
/// points at `upstream_sha`, nothing is created and
/// [`SyncError::DuplicateProposal`] is returned. Two calls with the same
/// arguments therefore yield one pull request and one duplicate error.
///
/// The create call is never retried. If it fails or times out, the whole
/// check must be run again.
#[instrument(skip_all, fields(repo = repo.map(|r| r.full_name.as_str()), upstream_sha = %upstream_sha.short()))]
pub async fn propose<G>(
    remote: &Remote<G>,
    repo: Option<&RepositoryRef>,
    upstream_sha: &Sha,
) -> Result<ProposalRef, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let repo = repo.ok_or(SyncError::NoRepository)?;
    let parent = repo
        .parent
        .as_deref()
        .ok_or_else(|| SyncError::NotAFork(repo.id()))?;

    let intent = ProposalIntent::new(repo, parent, upstream_sha.clone());
    let fork = intent.fork();

    let open = remote
        .list_open_pull_requests(&fork, &intent.head_ref())
        .await?;
    if let Some(existing) = open.iter().find(|pr| pr.head_sha == intent.upstream_sha) {
        tracing::info!(repo = %fork, existing = %existing.number, "Update proposal already open");
        return Err(SyncError::DuplicateProposal {
            repo: fork,
            existing: existing.number,
        });
    }

    tracing::info!(repo = %fork, head = %intent.head_ref(), "Opening update proposal");
    let created = remote
        .create_pull_request(intent.to_new_pull_request())
        .await?;
    tracing::info!(repo = %fork, pr = %created.number, "Update proposal opened");
    Ok(created)
}

/// [`propose`], with an existing proposal reported as an outcome rather than
/// an error.
pub async fn ensure_proposal<G>(
    remote: &Remote<G>,
    repo: &RepositoryRef,
    upstream_sha: &Sha,
) -> Result<ProposalOutcome, SyncError>
where
    G: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    match propose(remote, Some(repo), upstream_sha).await {
        Ok(created) => Ok(ProposalOutcome::Created(created)),
        Err(SyncError::DuplicateProposal { existing, .. }) => {
            Ok(ProposalOutcome::AlreadyExists { existing })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubErrorKind;
    use crate::sync::ErrorKind;
    use crate::test_utils::{FakeGitHub, fork_repo, upstream_repo};
    use crate::types::RepoId;
    use std::time::Duration;

    fn remote(github: FakeGitHub) -> Remote<FakeGitHub> {
        Remote::new(github, Duration::from_secs(5))
    }

    fn diverged_fork() -> FakeGitHub {
        let upstream = upstream_repo();
        FakeGitHub::new()
            .with_repo(upstream.clone())
            .with_fork(&upstream, RepositoryRef::new("user", "repo", "master"))
            .with_branch(&RepoId::new("user", "repo"), "master", "forkRepoCommitSha")
            .with_branch(&upstream.id(), "master", "upstreamRepoCommitSha")
    }

    #[tokio::test]
    async fn creates_pull_request_from_parent_default_branch() {
        let github = diverged_fork();
        let created = propose(
            &remote(github.clone()),
            Some(&fork_repo()),
            &Sha::new("upstreamRepoCommitSha"),
        )
        .await
        .unwrap();

        assert_eq!(created.head_sha, Sha::new("upstreamRepoCommitSha"));

        let requests = github.created_pull_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.repo, RepoId::new("user", "repo"));
        assert_eq!(request.head, "parent:master");
        assert_eq!(request.base, "master");
        assert_eq!(request.title, "Update from upstream repo parent/upstream_repo");
        assert!(request.body.contains("`parent/upstream_repo`"));
    }

    #[tokio::test]
    async fn second_call_reports_duplicate() {
        let github = diverged_fork();
        let remote = remote(github.clone());
        let repo = fork_repo();
        let sha = Sha::new("upstreamRepoCommitSha");

        let first = propose(&remote, Some(&repo), &sha).await.unwrap();
        let second = propose(&remote, Some(&repo), &sha).await.unwrap_err();

        match second {
            SyncError::DuplicateProposal { repo, existing } => {
                assert_eq!(repo, RepoId::new("user", "repo"));
                assert_eq!(existing, first.number);
            }
            other => panic!("Expected DuplicateProposal, got {:?}", other),
        }
        assert_eq!(github.open_pulls(&RepoId::new("user", "repo")).len(), 1);
        assert_eq!(github.created_pull_requests().len(), 1);
    }

    #[tokio::test]
    async fn ensure_proposal_folds_duplicate() {
        let github = diverged_fork().with_open_pull(
            &RepoId::new("user", "repo"),
            "parent:master",
            "upstreamRepoCommitSha",
        );

        let outcome = ensure_proposal(
            &remote(github.clone()),
            &fork_repo(),
            &Sha::new("upstreamRepoCommitSha"),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            ProposalOutcome::AlreadyExists {
                existing: PrNumber(1)
            }
        );
        assert!(github.created_pull_requests().is_empty());
    }

    #[tokio::test]
    async fn non_fork_is_rejected() {
        let github = diverged_fork();
        let err = propose(
            &remote(github.clone()),
            Some(&upstream_repo()),
            &Sha::new("upstreamRepoCommitSha"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAFork);
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_repository_is_rejected() {
        let github = diverged_fork();
        let err = propose(&remote(github.clone()), None, &Sha::new("sha"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NoRepository));
        assert_eq!(err.to_string(), "No repository found");
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn stale_open_proposal_is_not_a_duplicate() {
        // The open pull request carries an older upstream head, so a create is
        // attempted; GitHub refuses a second pull request for the same head.
        let github = diverged_fork().with_open_pull(
            &RepoId::new("user", "repo"),
            "parent:master",
            "olderUpstreamSha",
        );

        let err = propose(
            &remote(github.clone()),
            Some(&fork_repo()),
            &Sha::new("upstreamRepoCommitSha"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(github.created_pull_requests().len(), 1);
    }

    #[tokio::test]
    async fn listing_failure_prevents_create() {
        let github = diverged_fork().failing(&RepoId::new("user", "repo"), GitHubErrorKind::Auth);

        let err = propose(
            &remote(github.clone()),
            Some(&fork_repo()),
            &Sha::new("upstreamRepoCommitSha"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthError);
        assert!(github.created_pull_requests().is_empty());
    }
}
