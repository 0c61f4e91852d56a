//! Webhook ingress: signature verification and repository event parsing.

pub mod event;
pub mod signature;

pub use event::{EventError, parse_repository_event};
pub use signature::{SIGNATURE_HEADER, SignatureError, parse_signature_header, verify_delivery};
