//! GitHub API error types.
//!
//! Every failure from the remote host is classified into a [`GitHubErrorKind`].
//! The kind drives two decisions:
//!
//! - **Retry**: rate limits, timeouts, server errors and network failures are
//!   retried with backoff by the client (see [`super::retry`]).
//! - **Reporting**: the ingress boundary surfaces the kind so a webhook sender
//!   can decide whether to re-deliver.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitHubErrorKind {
    /// HTTP 404: the repository, branch or resource does not exist (or is invisible to us).
    NotFound,

    /// HTTP 401, or 403 without rate-limit wording.
    Auth,

    /// HTTP 429, or 403 with rate-limit / abuse-detection wording.
    RateLimited,

    /// The request did not complete in time.
    Timeout,

    /// HTTP 409.
    Conflict,

    /// HTTP 422, e.g. "A pull request already exists" or "No commits between".
    Validation,

    /// HTTP 5xx, or a GitHub message asking us to try again.
    Server,

    /// Connection-level failure without an HTTP status.
    Network,

    /// Anything else.
    Other,
}

impl GitHubErrorKind {
    /// Returns true if this error is worth retrying with backoff.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GitHubErrorKind::RateLimited
                | GitHubErrorKind::Timeout
                | GitHubErrorKind::Server
                | GitHubErrorKind::Network
        )
    }

    fn from_status(code: u16, message: &str) -> Self {
        match code {
            404 => GitHubErrorKind::NotFound,
            401 => GitHubErrorKind::Auth,
            429 => GitHubErrorKind::RateLimited,
            403 if is_rate_limit_error(message) => GitHubErrorKind::RateLimited,
            403 => GitHubErrorKind::Auth,
            409 => GitHubErrorKind::Conflict,
            422 => GitHubErrorKind::Validation,
            code if (500..600).contains(&code) => GitHubErrorKind::Server,
            _ => GitHubErrorKind::Other,
        }
    }
}

/// A classified GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error of the given kind without an octocrab source.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches an HTTP status code.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Categorizes an octocrab error.
    ///
    /// Responses GitHub answered carry their status and message in
    /// `octocrab::Error::GitHub`; those are classified by status. Every other
    /// variant (connection, TLS, body decoding) has no status and is classified
    /// from its rendered message.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let (status_code, message) = match &err {
            octocrab::Error::GitHub { source, .. } => {
                (Some(source.status_code.as_u16()), github_message(source))
            }
            other => (None, other.to_string()),
        };

        let kind = match status_code {
            Some(code) => GitHubErrorKind::from_status(code, &message),
            None if is_timeout_error(&message) => GitHubErrorKind::Timeout,
            None if is_network_error(&message) => GitHubErrorKind::Network,
            None => GitHubErrorKind::Other,
        };

        // GitHub occasionally answers a 4xx that resolves on its own
        let kind = if kind == GitHubErrorKind::Other && is_transient_message(&message) {
            GitHubErrorKind::Server
        } else {
            kind
        };

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// GitHub's top-level message, followed by any per-field error messages.
///
/// A 422 says only "Validation Failed" at the top level; the reason (e.g. "A
/// pull request already exists for user:master.") is in `errors`.
fn github_message(err: &octocrab::GitHubError) -> String {
    let details: Vec<&str> = err
        .errors
        .iter()
        .flatten()
        .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
        .collect();

    if details.is_empty() {
        err.message.clone()
    } else {
        format!("{}: {}", err.message, details.join("; "))
    }
}

/// Checks if an error message indicates a transient condition.
fn is_transient_message(message: &str) -> bool {
    message.to_lowercase().contains("try again")
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

fn is_timeout_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout") || message_lower.contains("timed out")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("connect")
        || message_lower.contains("network")
        || message_lower.contains("dns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(GitHubErrorKind::from_status(404, ""), GitHubErrorKind::NotFound);
        assert_eq!(GitHubErrorKind::from_status(401, ""), GitHubErrorKind::Auth);
        assert_eq!(
            GitHubErrorKind::from_status(403, "Resource not accessible by integration"),
            GitHubErrorKind::Auth
        );
        assert_eq!(
            GitHubErrorKind::from_status(403, "API rate limit exceeded for user"),
            GitHubErrorKind::RateLimited
        );
        assert_eq!(GitHubErrorKind::from_status(429, ""), GitHubErrorKind::RateLimited);
        assert_eq!(GitHubErrorKind::from_status(409, ""), GitHubErrorKind::Conflict);
        assert_eq!(GitHubErrorKind::from_status(422, ""), GitHubErrorKind::Validation);
        assert_eq!(GitHubErrorKind::from_status(502, ""), GitHubErrorKind::Server);
        assert_eq!(GitHubErrorKind::from_status(418, ""), GitHubErrorKind::Other);
    }

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("secondary rate limit"));
        assert!(is_rate_limit_error("abuse detection mechanism"));
        assert!(!is_rate_limit_error("Permission denied"));
    }

    #[test]
    fn timeout_and_network_detection() {
        assert!(is_timeout_error("operation timed out"));
        assert!(is_timeout_error("read timeout"));
        assert!(is_network_error("DNS resolution failed"));
        assert!(is_network_error("connection refused"));
        assert!(is_network_error("client error (Connect)"));
        assert!(!is_network_error("Not found"));
    }

    #[test]
    fn error_kind_retriable() {
        assert!(GitHubErrorKind::RateLimited.is_retriable());
        assert!(GitHubErrorKind::Timeout.is_retriable());
        assert!(GitHubErrorKind::Server.is_retriable());
        assert!(GitHubErrorKind::Network.is_retriable());
        assert!(!GitHubErrorKind::NotFound.is_retriable());
        assert!(!GitHubErrorKind::Auth.is_retriable());
        assert!(!GitHubErrorKind::Conflict.is_retriable());
        assert!(!GitHubErrorKind::Validation.is_retriable());
        assert!(!GitHubErrorKind::Other.is_retriable());
    }

    #[test]
    fn display_includes_status_when_known() {
        let err = GitHubApiError::new(GitHubErrorKind::NotFound, "Not Found").with_status(404);
        assert_eq!(err.to_string(), "GitHub API error (HTTP 404): Not Found");

        let err = GitHubApiError::new(GitHubErrorKind::Network, "connection reset");
        assert_eq!(err.to_string(), "GitHub API error: connection reset");
    }
}
