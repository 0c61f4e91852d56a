//! Failures of the sync core and their projection onto a stable taxonomy.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::github::{GitHubApiError, GitHubErrorKind};
use crate::types::{PrNumber, RepoId};

/// An error from any step of the sync core.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Divergence is only meaningful against a resolved upstream.
    #[error("The repository {0} isn't a fork.")]
    NotAFork(RepoId),

    #[error("No repository found")]
    NoRepository,

    /// An open proposal already carries the upstream head.
    #[error("A Backstroke pull request already exists on {repo}")]
    DuplicateProposal { repo: RepoId, existing: PrNumber },

    #[error("{operation} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error(transparent)]
    Api(#[from] GitHubApiError),

    /// The interpreter answered an effect with the wrong response variant.
    #[error("unexpected response to {0}")]
    UnexpectedResponse(&'static str),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NotAFork(_) => ErrorKind::NotAFork,
            SyncError::NoRepository => ErrorKind::NoRepository,
            SyncError::DuplicateProposal { .. } => ErrorKind::DuplicateProposal,
            SyncError::Timeout { .. } => ErrorKind::Timeout,
            SyncError::Api(e) => ErrorKind::from(e.kind),
            SyncError::UnexpectedResponse(_) => ErrorKind::Other,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

/// The error taxonomy reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotAFork,
    NoRepository,
    DuplicateProposal,
    NotFound,
    AuthError,
    RateLimited,
    Timeout,
    ValidationError,
    Conflict,
    ServerError,
    Other,
}

impl ErrorKind {
    /// Domain errors are the definitive result of an operation.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotAFork | ErrorKind::NoRepository | ErrorKind::DuplicateProposal
        )
    }

    /// Whether re-delivering the triggering event may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::Timeout | ErrorKind::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotAFork => "not_a_fork",
            ErrorKind::NoRepository => "no_repository",
            ErrorKind::DuplicateProposal => "duplicate_proposal",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AuthError => "auth_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Other => "other",
        }
    }
}

impl From<GitHubErrorKind> for ErrorKind {
    fn from(kind: GitHubErrorKind) -> Self {
        match kind {
            GitHubErrorKind::NotFound => ErrorKind::NotFound,
            GitHubErrorKind::Auth => ErrorKind::AuthError,
            GitHubErrorKind::RateLimited => ErrorKind::RateLimited,
            GitHubErrorKind::Timeout => ErrorKind::Timeout,
            GitHubErrorKind::Conflict => ErrorKind::Conflict,
            GitHubErrorKind::Validation => ErrorKind::ValidationError,
            // A dropped connection is as re-deliverable as a 5xx
            GitHubErrorKind::Server | GitHubErrorKind::Network => ErrorKind::ServerError,
            GitHubErrorKind::Other => ErrorKind::Other,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
