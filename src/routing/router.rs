//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile the configured proxy prefixes
//! - Decide proxy pipeline vs static asset server for a logical path
//!
//! # Design Decisions
//! - Immutable after construction
//! - Two outcomes only; anything that is not proxied is a static asset
//! - Method plays no part in the decision

use crate::config::RoutingConfig;
use crate::routing::matcher::{AnyMatcher, Matcher, PathPrefixMatcher};

/// Which branch handles the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward to the backend service.
    Proxy,
    /// Serve a file from the asset root.
    Static,
}

#[derive(Debug)]
pub struct Router {
    proxy: AnyMatcher,
}

impl Router {
    pub fn from_config(config: &RoutingConfig) -> Self {
        let matchers = config
            .proxy_prefixes
            .iter()
            .map(|prefix| Box::new(PathPrefixMatcher::new(prefix.clone())) as Box<dyn Matcher>)
            .collect();
        Self {
            proxy: AnyMatcher::new(matchers),
        }
    }

    pub fn route(&self, path: &str) -> Route {
        if self.proxy.matches(path) {
            Route::Proxy
        } else {
            Route::Static
        }
    }
}
