//! Backend response translation.
//!
//! # Responsibilities
//! - Split the first backend read into header block and body start
//! - Rewrite `HTTP/1.x <code> <reason>` into the CGI `Status:` header
//! - Drop connection-management headers
//! - Stream the remaining body through without buffering it
//!
//! # Design Decisions
//! - Only the first read is scanned for the header boundary; if it is not
//!   there, the bytes are passed through untouched (lenient)
//! - A zero-length read ends the response, whether it came from EOF, a read
//!   error or the read timeout

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::cgi::CRLF;
use crate::http::headers::is_suppressed_line;
use crate::http::CHUNK_SIZE;
use crate::net::TimedStream;

/// Separator between the header block and the body.
pub const HEADER_BOUNDARY: &[u8] = b"\r\n\r\n";

/// Position of the first header boundary in `buf`.
pub fn find_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_BOUNDARY.len())
        .position(|window| window == HEADER_BOUNDARY)
}

/// The first chunk of a backend response, split at the header boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFrame<'a> {
    /// Boundary found: header block (without the boundary) and body start.
    Framed { head: &'a [u8], body: &'a [u8] },
    /// No boundary in this chunk.
    Unframed(&'a [u8]),
}

impl<'a> ResponseFrame<'a> {
    pub fn split(buf: &'a [u8]) -> Self {
        match find_boundary(buf) {
            Some(at) => ResponseFrame::Framed {
                head: &buf[..at],
                body: &buf[at + HEADER_BOUNDARY.len()..],
            },
            None => ResponseFrame::Unframed(buf),
        }
    }
}

/// Rewrite a backend header block into CGI header lines, blank line included.
///
/// The status line becomes `Status:` followed by everything from its first
/// space on. A first line that is not an HTTP status line is dropped.
pub fn rewrite_head(head: &[u8]) -> Vec<u8> {
    let mut lines = head
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty());

    let mut out = Vec::with_capacity(head.len() + CRLF.len() * 2);

    if let Some(status_line) = lines.next() {
        if status_line.starts_with(b"HTTP") {
            if let Some(space) = status_line.iter().position(|&b| b == b' ') {
                out.extend_from_slice(b"Status:");
                out.extend_from_slice(&status_line[space..]);
                out.extend_from_slice(CRLF.as_bytes());
            }
        }
    }

    for line in lines {
        if is_suppressed_line(&String::from_utf8_lossy(line)) {
            continue;
        }
        out.extend_from_slice(line);
        out.extend_from_slice(CRLF.as_bytes());
    }

    out.extend_from_slice(CRLF.as_bytes());
    out
}

/// How the first backend chunk was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Nothing arrived before EOF or timeout.
    Empty,
    /// Headers were rewritten into CGI form.
    Rewritten,
    /// No header boundary in the first chunk; raw bytes passed through.
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub outcome: RelayOutcome,
    /// Bytes written to the CGI output.
    pub bytes_out: u64,
}

/// Read the backend response from `conn` and write it to `out` in CGI form.
///
/// Only errors writing to `out` are returned; backend-side trouble truncates
/// the response instead.
pub async fn relay_response<S, W>(
    conn: &mut TimedStream<S>,
    out: &mut W,
) -> io::Result<RelayReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];

    let n = conn.read_chunk(&mut buf).await;
    if n == 0 {
        tracing::warn!("Backend sent an empty response");
        return Ok(RelayReport {
            outcome: RelayOutcome::Empty,
            bytes_out: 0,
        });
    }

    let (outcome, mut bytes_out) = match ResponseFrame::split(&buf[..n]) {
        ResponseFrame::Framed { head, body } => {
            let head = rewrite_head(head);
            out.write_all(&head).await?;
            out.write_all(body).await?;
            (RelayOutcome::Rewritten, (head.len() + body.len()) as u64)
        }
        ResponseFrame::Unframed(raw) => {
            tracing::warn!(
                bytes = raw.len(),
                "No header boundary in first backend read, passing response through unmodified"
            );
            out.write_all(raw).await?;
            (RelayOutcome::Passthrough, raw.len() as u64)
        }
    };

    loop {
        let n = conn.read_chunk(&mut buf).await;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        bytes_out += n as u64;
    }

    out.flush().await?;
    Ok(RelayReport { outcome, bytes_out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::IoTimeouts;
    use std::time::Duration;

    async fn relay(chunks: Vec<Vec<u8>>) -> (RelayReport, Vec<u8>) {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let backend = tokio::spawn(async move {
            for chunk in chunks {
                server.write_all(&chunk).await.unwrap();
                server.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let mut conn = TimedStream::new(client, IoTimeouts::uniform(Duration::from_secs(1)));
        let mut out = Vec::new();
        let report = relay_response(&mut conn, &mut out).await.unwrap();
        backend.await.unwrap();
        (report, out)
    }

    #[test]
    fn boundary_detection() {
        assert_eq!(find_boundary(b"HTTP/1.1 200 OK\r\n\r\nbody"), Some(15));
        assert_eq!(find_boundary(b"HTTP/1.1 200 OK\r\nX: y\r\n"), None);
        assert_eq!(find_boundary(b""), None);
    }

    #[test]
    fn frame_split() {
        let frame = ResponseFrame::split(b"HTTP/1.1 204 No Content\r\n\r\n");
        assert_eq!(
            frame,
            ResponseFrame::Framed {
                head: b"HTTP/1.1 204 No Content",
                body: b"",
            }
        );
        assert_eq!(ResponseFrame::split(b"partial"), ResponseFrame::Unframed(b"partial"));
    }

    #[test]
    fn status_line_and_suppression() {
        let head = b"HTTP/1.1 404 Not Found\r\n\
                     Content-Type: text/plain\r\n\
                     Transfer-Encoding: chunked\r\n\
                     connection: keep-alive\r\n\
                     Set-Cookie: a=b";
        assert_eq!(
            rewrite_head(head),
            b"Status: 404 Not Found\r\nContent-Type: text/plain\r\nSet-Cookie: a=b\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn non_http_first_line_is_dropped() {
        assert_eq!(
            rewrite_head(b"garbage\r\nX-Thing: 1"),
            b"X-Thing: 1\r\n\r\n".to_vec()
        );
    }

    #[tokio::test]
    async fn rewrites_and_drops_connection_header() {
        let (report, out) = relay(vec![
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nhello"
                .to_vec(),
        ])
        .await;

        assert_eq!(out, b"Status: 200 OK\r\nContent-Type: text/plain\r\n\r\nhello");
        assert_eq!(report.outcome, RelayOutcome::Rewritten);
        assert_eq!(report.bytes_out, out.len() as u64);
    }

    #[tokio::test]
    async fn body_after_first_read_is_streamed_verbatim() {
        let tail: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let (report, out) = relay(vec![
            b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\nAB".to_vec(),
            tail.clone(),
        ])
        .await;

        let mut expected =
            b"Status: 200 OK\r\nContent-Type: application/octet-stream\r\n\r\nAB".to_vec();
        expected.extend_from_slice(&tail);
        assert_eq!(out, expected);
        assert_eq!(report.outcome, RelayOutcome::Rewritten);
    }

    #[tokio::test]
    async fn split_boundary_falls_back_to_passthrough() {
        let (report, out) = relay(vec![
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n".to_vec(),
            b"\r\nlate body".to_vec(),
        ])
        .await;

        assert_eq!(report.outcome, RelayOutcome::Passthrough);
        assert_eq!(out, b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nlate body");
    }

    #[tokio::test]
    async fn empty_response_writes_nothing() {
        let (report, out) = relay(vec![]).await;
        assert_eq!(report.outcome, RelayOutcome::Empty);
        assert!(out.is_empty());
    }
}
