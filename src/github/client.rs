//! Octocrab client wrapper.
//!
//! Unlike a repo-scoped client, `OctocrabClient` serves every repository a
//! fan-out touches: effects carry their own target repository.

use octocrab::Octocrab;

use super::retry::RetryConfig;

/// A GitHub API client.
///
/// Constructed once at process start and passed into the sync pipeline; there
/// is no global instance.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,

    /// Backoff schedule for retriable read failures.
    retry: RetryConfig,
}

impl OctocrabClient {
    pub fn new(client: Octocrab) -> Self {
        Self {
            client,
            retry: RetryConfig::DEFAULT,
        }
    }

    /// Creates a client authenticated with a personal access token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client))
    }

    /// Creates an unauthenticated client. Subject to much lower rate limits.
    pub fn anonymous() -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().build()?;
        Ok(Self::new(client))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
