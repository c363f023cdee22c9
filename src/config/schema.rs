//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so that running without a config file behaves
//! exactly like the stock preview deployment.

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

/// Root configuration for the CGI gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend service the proxy pipeline forwards to.
    pub backend: BackendConfig,

    /// Connect, read and write deadlines for the backend connection.
    pub timeouts: TimeoutConfig,

    /// Static asset locations.
    pub assets: AssetConfig,

    /// Path resolution and dispatch settings.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend host (IP literal or resolvable name).
    pub host: String,

    /// Backend TCP port.
    pub port: u16,
}

impl BackendConfig {
    /// Value sent in the `Host` header, `host:port`. IPv6 literals are
    /// bracketed.
    pub fn host_header(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23237,
        }
    }
}

/// Timeout configuration for the backend connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-read timeout in seconds.
    pub read_secs: u64,

    /// Per-write timeout in seconds.
    pub write_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            read_secs: 5,
            write_secs: 5,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Production asset directory, used when it exists.
    pub root: String,

    /// Directory used when `root` is missing (relative to the working dir).
    pub fallback_root: String,

    /// Document served for an empty logical path.
    pub default_document: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: "/var/apps/2fmusic-preview/target/ui".to_string(),
            fallback_root: ".".to_string(),
            default_document: "preview.html".to_string(),
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// File name of the CGI entry point as installed by the web server.
    pub script_name: String,

    /// Logical path prefixes forwarded to the backend.
    pub proxy_prefixes: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            script_name: "index.cgi".to_string(),
            proxy_prefixes: vec!["/api/".to_string(), "/login".to_string()],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines written to stderr.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
