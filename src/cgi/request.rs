//! Request descriptor built from the CGI environment.

use crate::cgi::env::CgiEnv;
use crate::http::headers::forwarded_request_headers;
use crate::routing::resolver::resolve_path;

/// Everything the gateway needs to know about the inbound request.
///
/// Constructed once per invocation and never mutated. The body bytes are not
/// held here; they stay in the invocation's input stream and are read only by
/// the request translator, bounded by `content_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Logical path, as produced by the path resolver.
    pub path: String,
    pub method: String,
    /// Query string without the leading `?`; `None` when absent or empty.
    pub query_string: Option<String>,
    /// Present forwarded headers, `(wire name, value)`, in table order.
    pub headers: Vec<(&'static str, String)>,
    /// Declared body length, parsed from `CONTENT_LENGTH`.
    pub content_length: Option<u64>,
}

impl RequestDescriptor {
    pub fn from_env(env: &CgiEnv, script_name: &str) -> Self {
        let path = resolve_path(env, script_name);
        let method = env
            .get_non_empty("REQUEST_METHOD")
            .unwrap_or("GET")
            .to_string();
        let query_string = env.get_non_empty("QUERY_STRING").map(str::to_string);

        let headers = forwarded_request_headers()
            .filter_map(|(name, var)| env.get(var).map(|value| (name, value.to_string())))
            .collect();

        let content_length = env.get("CONTENT_LENGTH").and_then(parse_content_length);

        Self {
            path,
            method,
            query_string,
            headers,
            content_length,
        }
    }

    /// Request target sent on the wire: path plus `?query` when present.
    pub fn target(&self) -> String {
        match &self.query_string {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// Leading decimal digits of `raw`, ignoring leading whitespace and any
/// trailing junk. `12abc` declares 12 bytes; `lots` declares none.
fn parse_content_length(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let parsed = digits[..end].parse::<u64>().ok();
    match parsed {
        None => {
            tracing::warn!(
                content_length = %raw,
                "Unparseable CONTENT_LENGTH, no body will be forwarded"
            );
        }
        Some(n) if end < digits.trim_end().len() => {
            tracing::warn!(
                content_length = %raw,
                declared = n,
                "Trailing junk in CONTENT_LENGTH ignored"
            );
        }
        Some(_) => {}
    }
    parsed
}
