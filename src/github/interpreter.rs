//! GitHub effect interpreter using octocrab.
//!
//! Every effect maps to a single REST route (or a paginated sequence of them)
//! issued through octocrab's raw `get`/`post`, deserialized into the minimal
//! response shapes below.
//!
//! Key implementation details:
//! - Reads retry retriable failures with exponential backoff
//! - Pull request creation is never retried here (see [`super::retry`])
//! - Branch names are URL-encoded (`feature/foo` → `feature%2Ffoo`)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{BranchHead, NewPullRequest, PrNumber, ProposalRef, RepoId, RepositoryRef, Sha};

use super::client::OctocrabClient;
use super::error::{GitHubApiError, GitHubErrorKind};
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

/// GitHub's maximum page size.
const PER_PAGE: u8 = 100;

/// Safety limit on pages fetched for a single listing.
const MAX_PAGES: u32 = 50;

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let policy = if effect.is_mutation() {
            RetryPolicy::NoRetry
        } else {
            RetryPolicy::RetryTransient
        };
        interpret_github_effect(self, effect, self.retry_config(), policy).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
    retry_config: RetryConfig,
    retry_policy: RetryPolicy,
) -> Result<GitHubResponse, GitHubApiError> {
    retry_with_backoff(retry_config, retry_policy, || {
        execute_effect(client, effect.clone())
    })
    .await
    .into_result()
}

/// Executes a single effect without retry logic.
async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetRepository { repo } => get_repository(client, &repo).await,
        GitHubEffect::GetBranch { repo, branch } => get_branch(client, &repo, &branch).await,
        GitHubEffect::ListForks { repo } => list_forks(client, &repo).await,
        GitHubEffect::CreatePullRequest(request) => create_pull_request(client, request).await,
        GitHubEffect::ListOpenPullRequests { repo, head } => {
            list_open_pull_requests(client, &repo, &head).await
        }
        GitHubEffect::SearchIssues { query } => search_issues(client, &query).await,
    }
}

// ─── Response Shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    full_name: Option<String>,
    owner: Option<OwnerResponse>,
    default_branch: Option<String>,
    #[serde(default)]
    fork: bool,
    parent: Option<Box<RepoResponse>>,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

impl RepoResponse {
    fn into_repository_ref(self) -> Result<RepositoryRef, GitHubApiError> {
        let owner = self.owner.map(|o| o.login).ok_or_else(|| {
            GitHubApiError::new(
                GitHubErrorKind::Other,
                format!("repository {} has no owner in response", self.name),
            )
        })?;
        let default_branch = self.default_branch.ok_or_else(|| {
            GitHubApiError::new(
                GitHubErrorKind::Other,
                format!("repository {}/{} has no default branch", owner, self.name),
            )
        })?;
        let parent = match self.parent {
            Some(parent) => Some(Box::new(parent.into_repository_ref()?)),
            None => None,
        };
        Ok(RepositoryRef {
            full_name: self
                .full_name
                .unwrap_or_else(|| format!("{}/{}", owner, self.name)),
            owner,
            name: self.name,
            default_branch,
            is_fork: self.fork,
            parent,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    head: PullHeadResponse,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullHeadResponse {
    sha: String,
}

impl From<PullResponse> for ProposalRef {
    fn from(pull: PullResponse) -> Self {
        ProposalRef {
            number: PrNumber(pull.number),
            head_sha: Sha::new(pull.head.sha),
            html_url: pull.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
}

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<&'a str>,
    per_page: u8,
    page: u32,
}

// ─── Routes ───────────────────────────────────────────────────────────────────

fn repo_route(repo: &RepoId) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

fn branch_route(repo: &RepoId, branch: &str) -> String {
    format!(
        "{}/branches/{}",
        repo_route(repo),
        urlencoding::encode(branch)
    )
}

// ─── Repository Operations ────────────────────────────────────────────────────

async fn get_repository(
    client: &OctocrabClient,
    repo: &RepoId,
) -> Result<GitHubResponse, GitHubApiError> {
    let result: Result<RepoResponse, _> = client.inner().get(repo_route(repo), None::<&()>).await;

    match result {
        Ok(response) => Ok(GitHubResponse::Repository(response.into_repository_ref()?)),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn get_branch(
    client: &OctocrabClient,
    repo: &RepoId,
    branch: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let result: Result<BranchResponse, _> = client
        .inner()
        .get(branch_route(repo, branch), None::<&()>)
        .await;

    match result {
        Ok(response) => Ok(GitHubResponse::Branch(BranchHead::new(response.commit.sha))),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

/// Lists every fork of `repo`.
///
/// Entries without an owner or default branch cannot be proposed to and are
/// left out, so the result (and a fan-out's `attempted` count) can be smaller
/// than the repository's fork count.
async fn list_forks(
    client: &OctocrabClient,
    repo: &RepoId,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("{}/forks", repo_route(repo));
    let pages: Vec<RepoResponse> = get_all_pages(client, &route, None, None).await?;

    Ok(GitHubResponse::Forks(complete_forks(repo, pages)))
}

fn complete_forks(repo: &RepoId, pages: Vec<RepoResponse>) -> Vec<RepositoryRef> {
    let listed = pages.len();
    let forks: Vec<RepositoryRef> = pages
        .into_iter()
        .filter_map(|fork| match fork.into_repository_ref() {
            Ok(fork) => Some(fork),
            Err(e) => {
                tracing::warn!(repo = %repo, error = %e, "Skipping fork with incomplete metadata");
                None
            }
        })
        .collect();

    if forks.len() < listed {
        tracing::warn!(
            repo = %repo,
            listed,
            usable = forks.len(),
            "Some forks were left out of the fan-out"
        );
    }
    forks
}

// ─── Pull Request Operations ──────────────────────────────────────────────────

async fn create_pull_request(
    client: &OctocrabClient,
    request: NewPullRequest,
) -> Result<GitHubResponse, GitHubApiError> {
    #[derive(Serialize)]
    struct CreateRequest<'a> {
        title: &'a str,
        head: &'a str,
        base: &'a str,
        body: &'a str,
    }

    let route = format!("{}/pulls", repo_route(&request.repo));
    let body = CreateRequest {
        title: &request.title,
        head: &request.head,
        base: &request.base,
        body: &request.body,
    };

    let result: Result<PullResponse, _> = client.inner().post(route, Some(&body)).await;

    match result {
        Ok(pull) => Ok(GitHubResponse::PullRequestCreated(pull.into())),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn list_open_pull_requests(
    client: &OctocrabClient,
    repo: &RepoId,
    head: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("{}/pulls", repo_route(repo));
    let pulls: Vec<PullResponse> = get_all_pages(client, &route, Some("open"), Some(head)).await?;

    Ok(GitHubResponse::PullRequests(
        pulls.into_iter().map(ProposalRef::from).collect(),
    ))
}

// ─── Search ───────────────────────────────────────────────────────────────────

async fn search_issues(
    client: &OctocrabClient,
    query: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    #[derive(Serialize)]
    struct SearchParams<'a> {
        q: &'a str,
        per_page: u8,
    }

    let params = SearchParams { q: query, per_page: 1 };
    let result: Result<SearchResponse, _> = client
        .inner()
        .get("/search/issues", Some(&params))
        .await;

    match result {
        Ok(response) => Ok(GitHubResponse::IssueSearch {
            total_count: response.total_count,
        }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Pagination ───────────────────────────────────────────────────────────────

/// Fetches every page of a list endpoint.
///
/// Stops at the first short page, or at `MAX_PAGES` with a warning.
async fn get_all_pages<T: DeserializeOwned>(
    client: &OctocrabClient,
    route: &str,
    state: Option<&str>,
    head: Option<&str>,
) -> Result<Vec<T>, GitHubApiError> {
    let mut all_items = Vec::new();

    for page in 1..=MAX_PAGES {
        let params = ListParams {
            state,
            head,
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<T> = client
            .inner()
            .get(route, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = items.len() < usize::from(PER_PAGE);
        all_items.extend(items);

        if is_last_page {
            return Ok(all_items);
        }
    }

    tracing::warn!(
        route,
        pages = MAX_PAGES,
        items = all_items.len(),
        "Hit pagination limit; results may be incomplete"
    );
    Ok(all_items)
}
