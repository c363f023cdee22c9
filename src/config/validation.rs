//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Reject asset settings that could escape the asset root
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `backend.port`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.host.trim().is_empty() {
        errors.push(ValidationError::new("backend.host", "must not be empty"));
    }
    if config.backend.port == 0 {
        errors.push(ValidationError::new("backend.port", "must be non-zero"));
    }

    let timeouts = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.read_secs", config.timeouts.read_secs),
        ("timeouts.write_secs", config.timeouts.write_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    let document = &config.assets.default_document;
    if document.is_empty() {
        errors.push(ValidationError::new("assets.default_document", "must not be empty"));
    } else if document.contains('/') || document.contains('\\') || document.contains("..") {
        errors.push(ValidationError::new(
            "assets.default_document",
            format!("must be a plain file name, got {:?}", document),
        ));
    }

    if config.routing.script_name.is_empty() {
        errors.push(ValidationError::new("routing.script_name", "must not be empty"));
    }
    if config.routing.proxy_prefixes.is_empty() {
        errors.push(ValidationError::new(
            "routing.proxy_prefixes",
            "at least one prefix is required",
        ));
    }
    for prefix in &config.routing.proxy_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                "routing.proxy_prefixes",
                format!("prefix {:?} must start with '/'", prefix),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
