//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! BackendConfig (host, port) + IoTimeouts
//!     → backend.rs (resolve, connect with deadline)
//!     → BackendConnection (exclusively owned by the proxy pipeline)
//!     → closed after the response is relayed
//! ```

pub mod backend;

pub use backend::{BackendConnection, TimedStream};
