//! Inbound repository events.
//!
//! Any delivery whose body carries a `repository` object is accepted (push
//! events are the usual trigger). Only the fields needed for routing are read.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{RepoId, RepositoryRef};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed body, no .repository.full_name key.")]
    MissingFullName,

    #[error("Malformed body, no .repository.default_branch key.")]
    MissingDefaultBranch,

    #[error("Malformed body, .repository.full_name is not owner/name.")]
    InvalidFullName,

    #[error("Malformed body, not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct EventBody {
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: Option<String>,
    full_name: Option<String>,
    default_branch: Option<String>,
    #[serde(default)]
    fork: bool,
    owner: Option<RawOwner>,
}

/// Push payloads carry `name`; most others carry only `login`.
#[derive(Debug, Deserialize)]
struct RawOwner {
    name: Option<String>,
    login: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Parses the repository an event is about.
///
/// `full_name` and `default_branch` are required. Owner and name come from
/// the payload when present and from `full_name` otherwise. The result never
/// carries a parent; only a repository fetch reports one.
pub fn parse_repository_event(body: &[u8]) -> Result<RepositoryRef, EventError> {
    let body: EventBody = serde_json::from_slice(body)?;
    let raw = body.repository.ok_or(EventError::MissingFullName)?;

    let full_name = non_empty(raw.full_name).ok_or(EventError::MissingFullName)?;
    let default_branch = non_empty(raw.default_branch).ok_or(EventError::MissingDefaultBranch)?;

    let owner = raw
        .owner
        .and_then(|o| non_empty(o.name).or(non_empty(o.login)));
    let name = non_empty(raw.name);

    let (owner, name) = match (owner, name) {
        (Some(owner), Some(name)) => (owner, name),
        (owner, name) => {
            let id = RepoId::parse(&full_name).ok_or(EventError::InvalidFullName)?;
            (owner.unwrap_or(id.owner), name.unwrap_or(id.name))
        }
    };

    Ok(RepositoryRef {
        owner,
        name,
        full_name,
        default_branch,
        is_fork: raw.fork,
        parent: None,
    })
}
