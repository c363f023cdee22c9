//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stderr)
//!     → request_id.rs (one id per invocation, carried on the request span)
//!
//! Consumers:
//!     → the web server's error log
//! ```
//!
//! # Design Decisions
//! - Structured logging with an optional JSON encoding
//! - Request ID flows through every event via the span

pub mod logging;
pub mod request_id;

pub use logging::init_logging;
pub use request_id::RequestId;
