//! Content type lookup by file extension.

use std::ffi::OsStr;
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

static MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("js", "application/javascript; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("svg", "image/svg+xml"),
    ("json", "application/json; charset=utf-8"),
];

/// Content type for `path`, matched case-insensitively on the extension.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(OsStr::to_str)
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(OCTET_STREAM)
}
