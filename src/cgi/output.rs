//! CGI response framing.
//!
//! A CGI program never writes an `HTTP/1.x` status line; it writes a
//! `Status: <code> <reason>` header (or none, meaning 200), its other
//! headers, a blank line, then the body.

use std::fmt;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::GatewayError;

/// Line terminator used for every header line we emit.
pub const CRLF: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgiStatus {
    pub code: u16,
    pub reason: &'static str,
}

impl CgiStatus {
    pub const FORBIDDEN: CgiStatus = CgiStatus {
        code: 403,
        reason: "Forbidden",
    };
    pub const NOT_FOUND: CgiStatus = CgiStatus {
        code: 404,
        reason: "Not Found",
    };
    pub const INTERNAL_SERVER_ERROR: CgiStatus = CgiStatus {
        code: 500,
        reason: "Internal Server Error",
    };
    pub const BAD_GATEWAY: CgiStatus = CgiStatus {
        code: 502,
        reason: "Bad Gateway",
    };

    /// `Status: 403 Forbidden`, without terminator.
    pub fn header_line(&self) -> String {
        format!("Status: {} {}", self.code, self.reason)
    }
}

impl fmt::Display for CgiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

/// Write a header block: each line followed by CRLF, then the blank line.
pub async fn write_headers<W, I, S>(out: &mut W, lines: I) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut block = String::new();
    for line in lines {
        block.push_str(line.as_ref());
        block.push_str(CRLF);
    }
    block.push_str(CRLF);
    out.write_all(block.as_bytes()).await
}

/// Emit a complete error response: status, blank line, plain-text body.
pub async fn write_error<W>(out: &mut W, err: &GatewayError) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_headers(out, [err.status().header_line()]).await?;
    out.write_all(err.body().as_bytes()).await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_response_layout() {
        let mut out = Vec::new();
        write_error(&mut out, &GatewayError::Forbidden).await.unwrap();
        assert_eq!(out, b"Status: 403 Forbidden\r\n\r\nAccess Denied");
    }

    #[tokio::test]
    async fn header_block_ends_with_blank_line() {
        let mut out = Vec::new();
        write_headers(&mut out, ["X-Debug-Path: ./a.css", "Content-Type: text/css"])
            .await
            .unwrap();
        assert_eq!(out, b"X-Debug-Path: ./a.css\r\nContent-Type: text/css\r\n\r\n");
    }
}
