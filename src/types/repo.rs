//! Repository snapshots and branch heads as fetched from the remote host.
//!
//! Every value here is fetched fresh for a single pipeline run and dropped with
//! it. Nothing is cached between runs: divergence must reflect the remote's
//! current state.

use serde::{Deserialize, Serialize};

use super::ids::{RepoId, Sha};

/// The `(owner, name)` pair a repository is compared against.
pub type UpstreamTarget = RepoId;

/// A repository as known at decision time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub is_fork: bool,
    /// The repository this one was forked from.
    ///
    /// Only populated by a full repository fetch; list endpoints and webhook
    /// payloads leave it empty even for forks.
    pub parent: Option<Box<RepositoryRef>>,
}

impl RepositoryRef {
    /// A non-fork repository. `full_name` is derived from owner and name.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        RepositoryRef {
            full_name: format!("{}/{}", owner, name),
            owner,
            name,
            default_branch: default_branch.into(),
            is_fork: false,
            parent: None,
        }
    }

    /// Marks this repository as a fork of `parent`.
    pub fn forked_from(mut self, parent: RepositoryRef) -> Self {
        self.is_fork = true;
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn id(&self) -> RepoId {
        RepoId::new(&self.owner, &self.name)
    }
}

/// The tip commit of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchHead {
    pub sha: Sha,
}

impl BranchHead {
    pub fn new(sha: impl Into<Sha>) -> Self {
        BranchHead { sha: sha.into() }
    }
}

/// The comparison of a fork's default-branch head with its upstream's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceResult {
    pub repo: RepositoryRef,
    pub diverged: bool,
    pub base_sha: Sha,
    pub upstream_sha: Sha,
}

impl DivergenceResult {
    /// Compares two heads by SHA equality.
    ///
    /// No ancestry walk: a fork that is ahead of its upstream still counts as
    /// diverged. The proposer's duplicate check keeps that from piling up
    /// pull requests.
    pub fn compare(repo: RepositoryRef, base: BranchHead, upstream: BranchHead) -> Self {
        DivergenceResult {
            repo,
            diverged: base.sha != upstream.sha,
            base_sha: base.sha,
            upstream_sha: upstream.sha,
        }
    }
}
