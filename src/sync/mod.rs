//! Fork synchronization.
//!
//! Everything here is re-derived from the remote host on each run; nothing is
//! cached or persisted between runs. Re-running on the same event is safe: the
//! proposer never opens a second pull request for an upstream head that
//! already has one.
//!
//! All remote access goes through a [`Remote`], which wraps an injected
//! [`crate::effects::GitHubInterpreter`] and bounds every call with a timeout.

pub mod divergence;
pub mod error;
pub mod fanout;
pub mod optout;
pub mod pipeline;
pub mod proposer;
pub mod remote;
pub mod router;
pub mod upstream;

pub use divergence::detect;
pub use error::{ErrorKind, SyncError};
pub use fanout::{DEFAULT_FAN_OUT_CONCURRENCY, FanOutOptions, FanOutSummary, fan_out};
pub use optout::{OPT_OUT_LABEL, has_opted_out, opt_out_query};
pub use pipeline::{PipelineOutcome, SkipReason, run_pipeline};
pub use proposer::{ProposalOutcome, ensure_proposal, propose};
pub use remote::Remote;
pub use router::{Dispatch, RouteOutcome, dispatch, route};
pub use upstream::{is_valid_override, resolve};
