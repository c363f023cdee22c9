//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (connect / per-read / per-write deadlines)
//!     → net::backend applies them to every socket operation
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries and no circuit breaking: one invocation, one attempt

pub mod timeouts;

pub use timeouts::IoTimeouts;
