//! Backstroke - keeps GitHub forks in sync with their upstream.
//!
//! When a repository receives a push, Backstroke checks every fork of it (or,
//! for a fork, the fork itself) and opens a pull request on each fork whose
//! default branch has fallen behind, unless the fork's owner has opted out.

pub mod config;
pub mod effects;
pub mod github;
pub mod server;
pub mod sync;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
