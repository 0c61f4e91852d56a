//! Core domain types for fork synchronisation.
//!
//! All of these are value objects built fresh for one pipeline run.

pub mod ids;
pub mod proposal;
pub mod repo;

pub use ids::{PrNumber, RepoId, Sha};
pub use proposal::{NewPullRequest, ProposalIntent, ProposalRef, update_body};
pub use repo::{BranchHead, DivergenceResult, RepositoryRef, UpstreamTarget};
