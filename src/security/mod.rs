//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_control.rs (peer IP against the allow-list)
//!     → Pass to dispatch
//!
//! Bind time:
//!     interfaces.rs (enumerate local addresses) → access_control.rs
//! ```
//!
//! # Design Decisions
//! - Opt-in: an empty allow-list admits every well-formed peer
//! - Exact IP match only, IPv4-mapped IPv6 folded to IPv4
//! - Admission runs before content negotiation or decoding

pub mod access_control;
pub mod interfaces;

pub use access_control::{AccessError, AccessFilter};
