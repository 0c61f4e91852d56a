//! Typed, timeout-bounded access to the remote host.
//!
//! Every suspension point of the sync core goes through [`Remote`]. Each call
//! is bounded by the configured timeout; a call that runs out of time is
//! abandoned and surfaces as [`SyncError::Timeout`].

use std::time::Duration;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;
use crate::types::{BranchHead, NewPullRequest, ProposalRef, RepoId, RepositoryRef};

use super::error::SyncError;

/// The remote host, as seen by the sync core.
#[derive(Debug, Clone)]
pub struct Remote<G> {
    github: G,
    timeout: Duration,
}

impl<G> Remote<G>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    pub fn new(github: G, timeout: Duration) -> Self {
        Remote { github, timeout }
    }

    async fn call(
        &self,
        operation: &'static str,
        effect: GitHubEffect,
    ) -> Result<GitHubResponse, SyncError> {
        tracing::debug!(operation, effect = ?effect, "Calling GitHub");

        match tokio::time::timeout(self.timeout, self.github.interpret(effect)).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => {
                tracing::warn!(operation, timeout = ?self.timeout, "GitHub call timed out");
                Err(SyncError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    pub async fn get_repository(&self, repo: &RepoId) -> Result<RepositoryRef, SyncError> {
        let effect = GitHubEffect::GetRepository { repo: repo.clone() };
        match self.call("get_repository", effect).await? {
            GitHubResponse::Repository(repo) => Ok(repo),
            _ => Err(SyncError::UnexpectedResponse("get_repository")),
        }
    }

    pub async fn get_branch(&self, repo: &RepoId, branch: &str) -> Result<BranchHead, SyncError> {
        let effect = GitHubEffect::GetBranch {
            repo: repo.clone(),
            branch: branch.to_string(),
        };
        match self.call("get_branch", effect).await? {
            GitHubResponse::Branch(head) => Ok(head),
            _ => Err(SyncError::UnexpectedResponse("get_branch")),
        }
    }

    pub async fn list_forks(&self, repo: &RepoId) -> Result<Vec<RepositoryRef>, SyncError> {
        let effect = GitHubEffect::ListForks { repo: repo.clone() };
        match self.call("list_forks", effect).await? {
            GitHubResponse::Forks(forks) => Ok(forks),
            _ => Err(SyncError::UnexpectedResponse("list_forks")),
        }
    }

    /// Opens a pull request. Never retried: a timeout here is ambiguous.
    pub async fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> Result<ProposalRef, SyncError> {
        match self
            .call("create_pull_request", GitHubEffect::CreatePullRequest(request))
            .await?
        {
            GitHubResponse::PullRequestCreated(pr) => Ok(pr),
            _ => Err(SyncError::UnexpectedResponse("create_pull_request")),
        }
    }

    pub async fn list_open_pull_requests(
        &self,
        repo: &RepoId,
        head: &str,
    ) -> Result<Vec<ProposalRef>, SyncError> {
        let effect = GitHubEffect::ListOpenPullRequests {
            repo: repo.clone(),
            head: head.to_string(),
        };
        match self.call("list_open_pull_requests", effect).await? {
            GitHubResponse::PullRequests(pulls) => Ok(pulls),
            _ => Err(SyncError::UnexpectedResponse("list_open_pull_requests")),
        }
    }

    /// Runs an issue search and returns only the number of matches.
    pub async fn search_issue_count(&self, query: &str) -> Result<u64, SyncError> {
        let effect = GitHubEffect::SearchIssues {
            query: query.to_string(),
        };
        match self.call("search_issues", effect).await? {
            GitHubResponse::IssueSearch { total_count } => Ok(total_count),
            _ => Err(SyncError::UnexpectedResponse("search_issues")),
        }
    }
}
