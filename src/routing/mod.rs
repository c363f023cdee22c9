//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! CgiEnv (PATH_INFO, REQUEST_URI)
//!     → resolver.rs (logical path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: Route::Proxy or Route::Static
//! ```
//!
//! # Design Decisions
//! - Routes compiled from config, immutable afterwards
//! - No regex (prefix matching only)
//! - Deterministic: same path always yields the same route

pub mod matcher;
pub mod resolver;
pub mod router;

pub use resolver::resolve_path;
pub use router::{Route, Router};
