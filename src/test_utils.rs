//! Shared test utilities: an in-memory GitHub and arbitrary generators for
//! property-based testing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::{GitHubApiError, GitHubErrorKind};
use crate::types::{
    BranchHead, NewPullRequest, PrNumber, ProposalRef, RepoId, RepositoryRef, Sha,
};

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}

pub fn arb_repo_id() -> impl Strategy<Value = RepoId> {
    ("[a-z][a-z0-9-]{0,15}", "[a-z][a-z0-9_.-]{0,15}")
        .prop_map(|(owner, name)| RepoId::new(owner, name))
}

/// `parent/upstream_repo`, default branch `master`.
pub fn upstream_repo() -> RepositoryRef {
    RepositoryRef::new("parent", "upstream_repo", "master")
}

/// `user/repo`, default branch `master`, forked from [`upstream_repo`].
pub fn fork_repo() -> RepositoryRef {
    RepositoryRef::new("user", "repo", "master").forked_from(upstream_repo())
}

// ─── FakeGitHub ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct FakePull {
    number: u64,
    head: String,
    sha: Sha,
}

impl FakePull {
    fn to_ref(&self) -> ProposalRef {
        ProposalRef {
            number: PrNumber(self.number),
            head_sha: self.sha.clone(),
            html_url: None,
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    repos: HashMap<RepoId, RepositoryRef>,
    branches: HashMap<(RepoId, String), Sha>,
    /// Forks as the list endpoint reports them: no parent attached.
    forks: HashMap<RepoId, Vec<RepositoryRef>>,
    pulls: HashMap<RepoId, Vec<FakePull>>,
    search_counts: HashMap<String, u64>,
    failures: HashMap<RepoId, GitHubErrorKind>,
    search_failure: Option<GitHubErrorKind>,
    delays: HashMap<RepoId, Duration>,
    latency: Option<Duration>,
    calls: Vec<GitHubEffect>,
    next_pr: u64,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<FakeState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// An in-memory GitHub.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct FakeGitHub {
    inner: Arc<Inner>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.inner.state.lock().unwrap());
        self
    }

    pub fn with_repo(self, repo: RepositoryRef) -> Self {
        self.with_state(|s| {
            s.repos.insert(repo.id(), repo);
        })
    }

    pub fn with_branch(self, repo: &RepoId, branch: &str, sha: &str) -> Self {
        self.with_state(|s| {
            s.branches
                .insert((repo.clone(), branch.to_string()), Sha::new(sha));
        })
    }

    /// Registers `fork` as a fork of `parent`, both as a full repository and
    /// in `parent`'s fork listing.
    pub fn with_fork(self, parent: &RepositoryRef, fork: RepositoryRef) -> Self {
        self.with_state(|s| {
            let mut listed = fork.clone();
            listed.is_fork = true;
            listed.parent = None;
            s.forks.entry(parent.id()).or_default().push(listed);
            s.repos
                .insert(fork.id(), fork.forked_from(parent.clone()));
        })
    }

    pub fn with_open_pull(self, repo: &RepoId, head: &str, sha: &str) -> Self {
        self.with_state(|s| {
            s.next_pr += 1;
            let number = s.next_pr;
            s.pulls.entry(repo.clone()).or_default().push(FakePull {
                number,
                head: head.to_string(),
                sha: Sha::new(sha),
            });
        })
    }

    pub fn with_search_count(self, query: &str, total_count: u64) -> Self {
        self.with_state(|s| {
            s.search_counts.insert(query.to_string(), total_count);
        })
    }

    /// Every effect targeting `repo` fails with `kind`.
    pub fn failing(self, repo: &RepoId, kind: GitHubErrorKind) -> Self {
        self.with_state(|s| {
            s.failures.insert(repo.clone(), kind);
        })
    }

    pub fn failing_search(self, kind: GitHubErrorKind) -> Self {
        self.with_state(|s| s.search_failure = Some(kind))
    }

    /// Every effect targeting `repo` sleeps for `delay` first.
    pub fn delayed(self, repo: &RepoId, delay: Duration) -> Self {
        self.with_state(|s| {
            s.delays.insert(repo.clone(), delay);
        })
    }

    /// Every effect sleeps for `latency` first.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.with_state(|s| s.latency = Some(latency))
    }

    // ─── Inspection ───

    pub fn calls(&self) -> Vec<GitHubEffect> {
        self.inner.state.lock().unwrap().calls.clone()
    }

    pub fn open_pulls(&self, repo: &RepoId) -> Vec<ProposalRef> {
        let state = self.inner.state.lock().unwrap();
        state
            .pulls
            .get(repo)
            .map(|pulls| pulls.iter().map(FakePull::to_ref).collect())
            .unwrap_or_default()
    }

    pub fn created_pull_requests(&self) -> Vec<NewPullRequest> {
        self.calls()
            .into_iter()
            .filter_map(|effect| match effect {
                GitHubEffect::CreatePullRequest(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// The highest number of effects that were in progress at once.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the call is dropped mid-sleep.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Inner {
    fn begin(&self, effect: &GitHubEffect) -> (InFlightGuard<'_>, Option<Duration>) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        state.calls.push(effect.clone());
        let delay = effect
            .repo()
            .and_then(|repo| state.delays.get(repo).copied())
            .or(state.latency);
        (InFlightGuard(&self.in_flight), delay)
    }

    fn respond(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        let mut state = self.state.lock().unwrap();

        if let Some(kind) = effect.repo().and_then(|repo| state.failures.get(repo)) {
            return Err(GitHubApiError::new(*kind, format!("injected failure for {:?}", effect)));
        }

        match effect {
            GitHubEffect::GetRepository { repo } => state
                .repos
                .get(&repo)
                .cloned()
                .map(GitHubResponse::Repository)
                .ok_or_else(|| not_found(&repo)),

            GitHubEffect::GetBranch { repo, branch } => state
                .branches
                .get(&(repo.clone(), branch))
                .cloned()
                .map(|sha| GitHubResponse::Branch(BranchHead::new(sha)))
                .ok_or_else(|| not_found(&repo)),

            GitHubEffect::ListForks { repo } => {
                if !state.repos.contains_key(&repo) && !state.forks.contains_key(&repo) {
                    return Err(not_found(&repo));
                }
                Ok(GitHubResponse::Forks(
                    state.forks.get(&repo).cloned().unwrap_or_default(),
                ))
            }

            GitHubEffect::CreatePullRequest(request) => {
                let (head_owner, head_branch) =
                    request.head.split_once(':').unwrap_or(("", request.head.as_str()));
                let sha = state
                    .branches
                    .iter()
                    .find(|((repo, branch), _)| repo.owner == head_owner && branch == head_branch)
                    .map(|(_, sha)| sha.clone())
                    .ok_or_else(|| {
                        GitHubApiError::new(GitHubErrorKind::Validation, "Invalid head")
                            .with_status(422)
                    })?;

                let already_open = state
                    .pulls
                    .get(&request.repo)
                    .is_some_and(|pulls| pulls.iter().any(|p| p.head == request.head));
                if already_open {
                    return Err(GitHubApiError::new(
                        GitHubErrorKind::Validation,
                        format!("A pull request already exists for {}.", request.head),
                    )
                    .with_status(422));
                }

                state.next_pr += 1;
                let pull = FakePull {
                    number: state.next_pr,
                    head: request.head.clone(),
                    sha,
                };
                let created = pull.to_ref();
                state.pulls.entry(request.repo).or_default().push(pull);
                Ok(GitHubResponse::PullRequestCreated(created))
            }

            GitHubEffect::ListOpenPullRequests { repo, head } => Ok(GitHubResponse::PullRequests(
                state
                    .pulls
                    .get(&repo)
                    .map(|pulls| {
                        pulls
                            .iter()
                            .filter(|p| p.head == head)
                            .map(FakePull::to_ref)
                            .collect()
                    })
                    .unwrap_or_default(),
            )),

            GitHubEffect::SearchIssues { query } => {
                if let Some(kind) = state.search_failure {
                    return Err(GitHubApiError::new(kind, "injected search failure"));
                }
                Ok(GitHubResponse::IssueSearch {
                    total_count: state.search_counts.get(&query).copied().unwrap_or(0),
                })
            }
        }
    }
}

fn not_found(repo: &RepoId) -> GitHubApiError {
    GitHubApiError::new(GitHubErrorKind::NotFound, format!("Not Found: {}", repo)).with_status(404)
}

impl GitHubInterpreter for FakeGitHub {
    type Error = GitHubApiError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            let (_guard, delay) = inner.begin(&effect);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            inner.respond(effect)
        }
    }
}
