//! Effect interpreter trait.
//!
//! The sync core never talks to GitHub directly: it hands [`GitHubEffect`]s to
//! an interpreter injected by the caller. Production wires
//! [`crate::github::OctocrabClient`]; tests wire an in-memory fake.

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Effects carry the repository they target, so one interpreter instance
/// serves every repository in a fan-out.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CannedGitHub {
///     responses: HashMap<GitHubEffect, GitHubResponse>,
/// }
///
/// impl GitHubInterpreter for CannedGitHub {
///     type Error = GitHubApiError;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         self.responses.get(&effect).cloned().ok_or_else(|| {
///             GitHubApiError::new(GitHubErrorKind::NotFound, format!("{:?}", effect))
///         })
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
