//! GitHub API client and effect interpreter.
//!
//! This module executes [`crate::effects::GitHubEffect`]s through the octocrab
//! library by implementing the `GitHubInterpreter` trait.
//!
//! Key features:
//! - Exponential backoff retry for retriable read failures
//! - Error classification onto a fixed set of kinds
//! - Pagination for fork and pull request listings

mod client;
mod error;
mod interpreter;
mod retry;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
pub use retry::{RetryConfig, RetryPolicy, RetryResult, retry_with_backoff};
