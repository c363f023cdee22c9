//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → gateway.rs (route, pick branch)
//!     → request.rs (render HTTP/1.1 head, stream body to backend)
//!     → [backend]
//!     → response.rs (status line → Status:, drop hop headers, stream body)
//!     → CGI output
//!
//! headers.rs holds the one table both translators consult.
//! ```

pub mod gateway;
pub mod headers;
pub mod request;
pub mod response;

/// Buffer size for every streamed copy: request body, response body, files.
pub const CHUNK_SIZE: usize = 4096;

pub use gateway::Gateway;
pub use headers::{HeaderPolicy, HeaderRule, HEADER_TABLE};
pub use response::{RelayOutcome, RelayReport, ResponseFrame};
