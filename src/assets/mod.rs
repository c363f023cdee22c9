//! Static asset subsystem.
//!
//! # Data Flow
//! ```text
//! logical path
//!     → server.rs (traversal check, base dir choice, join)
//!     → mime.rs (content type by extension)
//!     → X-Debug-Path + Content-Type headers, then file bytes
//! ```

pub mod mime;
pub mod server;

pub use mime::{content_type_for, OCTET_STREAM};
pub use server::AssetServer;
