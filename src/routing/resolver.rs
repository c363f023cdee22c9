//! Logical path resolution.
//!
//! # Responsibilities
//! - Prefer `PATH_INFO` when the web server set it sensibly
//! - Otherwise derive the path from `REQUEST_URI` by cutting everything up to
//!   and including the script name
//!
//! # Design Decisions
//! - Never fails: worst case is `/`
//! - Pure function of the environment snapshot (same input, same path)

use crate::cgi::CgiEnv;

/// Compute the logical request path for this invocation.
pub fn resolve_path(env: &CgiEnv, script_name: &str) -> String {
    // Some servers put the script name itself into PATH_INFO; that value is
    // useless, fall through to REQUEST_URI.
    if let Some(path_info) = env.get_non_empty("PATH_INFO") {
        if !path_info.contains(script_name) {
            return path_info.to_string();
        }
    }

    let Some(uri) = env.get("REQUEST_URI") else {
        return "/".to_string();
    };

    let without_query = match uri.split_once('?') {
        Some((path, _)) => path,
        None => uri,
    };

    match without_query.find(script_name) {
        Some(start) => without_query[start + script_name.len()..].to_string(),
        None => "/".to_string(),
    }
}
