//! Preview CGI gateway library.
//!
//! One invocation, one request: decide between a static asset and the
//! backend service, then translate between the CGI environment and a raw
//! HTTP/1.1 exchange over TCP.

pub mod assets;
pub mod cgi;
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use cgi::{CgiEnv, RequestDescriptor};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::Gateway;
