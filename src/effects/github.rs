//! GitHub API effect types.
//!
//! These types describe the remote-host operations the sync core needs, as data,
//! without executing them. An interpreter (see [`super::GitHubInterpreter`])
//! executes them against the real API or a test double.

use serde::{Deserialize, Serialize};

use crate::types::{BranchHead, NewPullRequest, ProposalRef, RepoId, RepositoryRef};

/// A GitHub API effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Repository Queries ───────────────────────────────────────────────────
    /// Fetch a repository, including its parent if it is a fork.
    GetRepository { repo: RepoId },

    /// Fetch the head of a branch.
    GetBranch { repo: RepoId, branch: String },

    /// List every fork of a repository (all pages).
    ListForks { repo: RepoId },

    // ─── Pull Requests ────────────────────────────────────────────────────────
    /// Open a pull request.
    CreatePullRequest(NewPullRequest),

    /// List open pull requests whose head is `owner:branch`.
    ListOpenPullRequests { repo: RepoId, head: String },

    // ─── Search ───────────────────────────────────────────────────────────────
    /// Run an issue search and report only the match count.
    SearchIssues { query: String },
}

impl GitHubEffect {
    /// The repository this effect reads or writes, if it targets one.
    pub fn repo(&self) -> Option<&RepoId> {
        match self {
            GitHubEffect::GetRepository { repo }
            | GitHubEffect::GetBranch { repo, .. }
            | GitHubEffect::ListForks { repo }
            | GitHubEffect::ListOpenPullRequests { repo, .. } => Some(repo),
            GitHubEffect::CreatePullRequest(request) => Some(&request.repo),
            GitHubEffect::SearchIssues { .. } => None,
        }
    }

    /// Whether executing this effect changes remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, GitHubEffect::CreatePullRequest(_))
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetRepository`.
    Repository(RepositoryRef),

    /// Response to `GetBranch`.
    Branch(BranchHead),

    /// Response to `ListForks`.
    Forks(Vec<RepositoryRef>),

    /// Response to `CreatePullRequest`.
    PullRequestCreated(ProposalRef),

    /// Response to `ListOpenPullRequests`.
    PullRequests(Vec<ProposalRef>),

    /// Response to `SearchIssues`.
    IssueSearch { total_count: u64 },
}
