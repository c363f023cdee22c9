//! Timeout enforcement.
//!
//! # Responsibilities
//! - Hold the connect, read and write deadlines for one backend connection
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Read and write carry independent deadlines, applied per operation
//! - A read timeout ends the response; it is not reported as an error

use std::time::Duration;

use crate::config::TimeoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoTimeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl IoTimeouts {
    /// Same deadline for every operation.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            connect: limit,
            read: limit,
            write: limit,
        }
    }
}

impl From<&TimeoutConfig> for IoTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            read: Duration::from_secs(config.read_secs),
            write: Duration::from_secs(config.write_secs),
        }
    }
}

impl Default for IoTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}
