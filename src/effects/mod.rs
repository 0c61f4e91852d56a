//! Effects-as-data for the remote code host.
//!
//! The sync pipeline describes every remote call as a [`GitHubEffect`] and
//! hands it to a [`GitHubInterpreter`]. This enables:
//! - Dependency injection of the API client (no process-wide singleton)
//! - Test doubles per component
//! - Logging of intended operations

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
