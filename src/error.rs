//! Gateway error taxonomy.
//!
//! Every failure is terminal for the invocation. Failures detected before the
//! first output byte become a CGI status line plus a short plain-text body;
//! failures of the output stream itself (`Io`) are only logged.

use thiserror::Error;

use crate::cgi::CgiStatus;
use crate::config::ConfigError;

/// Body sent when the backend cannot be reached.
pub const BAD_GATEWAY_BODY: &str = "Bad Gateway: Cannot connect to 2FMusic Backend";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Requested path contains a traversal token.
    #[error("path traversal rejected")]
    Forbidden,

    /// Static asset could not be opened.
    #[error("asset not found: {path}")]
    NotFound { path: String },

    /// Address parsing or socket setup failed.
    #[error("internal error: {0}")]
    Internal(String),

    /// Backend refused or could not be reached.
    #[error("backend unreachable: {0}")]
    BadGateway(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing the CGI response failed.
    #[error("output stream error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// CGI status reported for this error.
    pub fn status(&self) -> CgiStatus {
        match self {
            GatewayError::Forbidden => CgiStatus::FORBIDDEN,
            GatewayError::NotFound { .. } => CgiStatus::NOT_FOUND,
            GatewayError::BadGateway(_) => CgiStatus::BAD_GATEWAY,
            GatewayError::Internal(_) | GatewayError::Config(_) | GatewayError::Io(_) => {
                CgiStatus::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Plain-text body sent to the client.
    pub fn body(&self) -> String {
        match self {
            GatewayError::Forbidden => "Access Denied".to_string(),
            GatewayError::NotFound { path } => format!("File Not Found: {}", path),
            GatewayError::Internal(message) => message.clone(),
            GatewayError::BadGateway(_) => BAD_GATEWAY_BODY.to_string(),
            GatewayError::Config(_) => "Configuration error".to_string(),
            GatewayError::Io(_) => "Internal Server Error".to_string(),
        }
    }
}
