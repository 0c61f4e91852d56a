//! Upstream resolution: which repository a fork is compared against.

use crate::types::{RepoId, RepositoryRef, UpstreamTarget};

/// Resolves the repository `repo` should be compared against.
///
/// In order of precedence:
/// 1. `upstream_override`, when it is exactly two non-empty `/`-separated
///    segments. Anything else is ignored.
/// 2. The parent, when `repo` is a fork with a known parent.
/// 3. `repo` itself.
pub fn resolve(repo: &RepositoryRef, upstream_override: Option<&str>) -> UpstreamTarget {
    if let Some(target) = upstream_override.and_then(RepoId::parse) {
        return target;
    }

    match &repo.parent {
        Some(parent) if repo.is_fork => parent.id(),
        _ => repo.id(),
    }
}

/// Whether `upstream_override` would take precedence in [`resolve`].
pub fn is_valid_override(upstream_override: Option<&str>) -> bool {
    upstream_override.and_then(RepoId::parse).is_some()
}
