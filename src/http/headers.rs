//! Header forwarding policy.
//!
//! One table drives both directions: the request side reads and emits the
//! `Forward` entries that have a CGI source variable, and the response side
//! drops backend header lines whose name is marked `Suppress`. Names missing
//! from the table are never read from the environment and always pass through
//! on the response side.

/// What the gateway does with a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    Forward,
    Suppress,
}

/// One entry of the header table.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    /// Canonical header name as written on the wire.
    pub name: &'static str,
    /// CGI variable carrying the inbound value, if the header is forwarded.
    pub cgi_var: Option<&'static str>,
    pub policy: HeaderPolicy,
}

const fn forward(name: &'static str, cgi_var: &'static str) -> HeaderRule {
    HeaderRule {
        name,
        cgi_var: Some(cgi_var),
        policy: HeaderPolicy::Forward,
    }
}

const fn suppress(name: &'static str) -> HeaderRule {
    HeaderRule {
        name,
        cgi_var: None,
        policy: HeaderPolicy::Suppress,
    }
}

/// Request headers are emitted in this order.
pub const HEADER_TABLE: &[HeaderRule] = &[
    forward("Content-Type", "CONTENT_TYPE"),
    forward("Content-Length", "CONTENT_LENGTH"),
    forward("Cookie", "HTTP_COOKIE"),
    forward("User-Agent", "HTTP_USER_AGENT"),
    forward("Authorization", "HTTP_AUTHORIZATION"),
    forward("Referer", "HTTP_REFERER"),
    forward("Accept", "HTTP_ACCEPT"),
    forward("Accept-Language", "HTTP_ACCEPT_LANGUAGE"),
    forward("X-Requested-With", "HTTP_X_REQUESTED_WITH"),
    // Connection management: no chunked re-framing, and the backend socket is
    // always closed by us.
    suppress("Transfer-Encoding"),
    suppress("Connection"),
];

/// Look up a header name, ignoring ASCII case.
pub fn rule_for(name: &str) -> Option<&'static HeaderRule> {
    HEADER_TABLE
        .iter()
        .find(|rule| rule.name.eq_ignore_ascii_case(name))
}

/// Rules the request translator reads from the CGI environment.
pub fn forwarded_request_headers() -> impl Iterator<Item = (&'static str, &'static str)> {
    HEADER_TABLE.iter().filter_map(|rule| match (rule.policy, rule.cgi_var) {
        (HeaderPolicy::Forward, Some(var)) => Some((rule.name, var)),
        _ => None,
    })
}

/// True if a raw `Name: value` line from the backend must be dropped.
///
/// Only the exact name before the colon is compared, so `Connection-Id`
/// is kept.
pub fn is_suppressed_line(line: &str) -> bool {
    let name = match line.split_once(':') {
        Some((name, _)) => name.trim(),
        None => line.trim(),
    };
    matches!(rule_for(name), Some(rule) if rule.policy == HeaderPolicy::Suppress)
}
