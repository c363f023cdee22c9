//! CGI boundary: what comes in through the environment and goes out on
//! stdout.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (CgiEnv snapshot, taken once in main)
//!     → request.rs (RequestDescriptor)
//!     → [routing + gateway]
//!     → output.rs (Status line, headers, blank line, body)
//!     → stdout
//! ```

pub mod env;
pub mod output;
pub mod request;

pub use env::CgiEnv;
pub use output::{write_error, write_headers, CgiStatus, CRLF};
pub use request::RequestDescriptor;
