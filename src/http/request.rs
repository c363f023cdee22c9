//! Backend request translation.
//!
//! # Responsibilities
//! - Render the request descriptor as a literal HTTP/1.1 request head
//! - Stream the declared request body from the CGI input to the backend
//!
//! # Design Decisions
//! - Always `Connection: close`; the backend socket is never reused
//! - Only the fixed forwarded header set is sent, never an empty header line
//! - A body shorter than its declared length is forwarded as-is (lenient)
//! - No declared length means no body, whatever the method

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::cgi::{RequestDescriptor, CRLF};
use crate::http::CHUNK_SIZE;
use crate::net::TimedStream;

/// Render request line, headers and the terminating blank line.
pub fn render_head(request: &RequestDescriptor, host: &str) -> Vec<u8> {
    let mut head = String::with_capacity(256);

    head.push_str(&format!("{} {} HTTP/1.1{}", request.method, request.target(), CRLF));
    head.push_str(&format!("Host: {}{}", host, CRLF));
    head.push_str(&format!("Connection: close{}", CRLF));

    for (name, value) in &request.headers {
        head.push_str(&format!("{}: {}{}", name, value, CRLF));
    }

    head.push_str(CRLF);
    head.into_bytes()
}

/// Send the request head and body over `conn`.
///
/// Returns the number of body bytes forwarded.
pub async fn write_request<S, R>(
    conn: &mut TimedStream<S>,
    request: &RequestDescriptor,
    host: &str,
    body: &mut R,
) -> io::Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    conn.write_all(&render_head(request, host)).await?;

    let forwarded = match request.content_length {
        Some(declared) => forward_body(conn, body, declared).await?,
        None => 0,
    };

    conn.flush().await?;
    Ok(forwarded)
}

async fn forward_body<S, R>(
    conn: &mut TimedStream<S>,
    body: &mut R,
    declared: u64,
) -> io::Result<u64>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    while total < declared {
        let want = (declared - total).min(CHUNK_SIZE as u64) as usize;
        let n = match body.read(&mut buf[..want]).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Reading request body failed");
                break;
            }
        };
        conn.write_all(&buf[..n]).await?;
        total += n as u64;
    }

    if total < declared {
        tracing::warn!(
            declared,
            forwarded = total,
            "Request body shorter than declared Content-Length, forwarding partial body"
        );
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgi::CgiEnv;
    use crate::resilience::IoTimeouts;
    use std::time::Duration;

    const HOST: &str = "127.0.0.1:23237";

    fn descriptor(pairs: &[(&str, &str)]) -> RequestDescriptor {
        RequestDescriptor::from_env(&CgiEnv::from_pairs(pairs.iter().copied()), "index.cgi")
    }

    async fn send(request: &RequestDescriptor, body: &[u8]) -> (u64, Vec<u8>) {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let mut conn = TimedStream::new(client, IoTimeouts::uniform(Duration::from_secs(1)));
        let mut body = body;

        let forwarded = write_request(&mut conn, request, HOST, &mut body).await.unwrap();
        drop(conn);

        let mut wire = Vec::new();
        server.read_to_end(&mut wire).await.unwrap();
        (forwarded, wire)
    }

    #[test]
    fn get_with_query() {
        let req = descriptor(&[
            ("REQUEST_URI", "/preview/index.cgi/api/search?q=x"),
            ("QUERY_STRING", "q=x"),
            ("HTTP_ACCEPT", "*/*"),
        ]);
        let head = String::from_utf8(render_head(&req, HOST)).unwrap();
        assert_eq!(
            head,
            "GET /api/search?q=x HTTP/1.1\r\n\
             Host: 127.0.0.1:23237\r\n\
             Connection: close\r\n\
             Accept: */*\r\n\
             \r\n"
        );
    }

    #[test]
    fn empty_query_not_appended() {
        let req = descriptor(&[("PATH_INFO", "/login"), ("QUERY_STRING", "")]);
        let head = String::from_utf8(render_head(&req, HOST)).unwrap();
        assert!(head.starts_with("GET /login HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn post_body_forwarded_exactly() {
        let req = descriptor(&[
            ("PATH_INFO", "/api/login"),
            ("REQUEST_METHOD", "POST"),
            ("CONTENT_TYPE", "application/json"),
            ("CONTENT_LENGTH", "13"),
        ]);
        // trailing bytes beyond the declared length must stay unread
        let (forwarded, wire) = send(&req, b"{\"user\":\"a\"}\nEXTRA").await;

        assert_eq!(forwarded, 13);
        let wire = String::from_utf8(wire).unwrap();
        assert!(wire.contains("Content-Type: application/json\r\nContent-Length: 13\r\n\r\n"));
        assert!(wire.ends_with("\r\n\r\n{\"user\":\"a\"}\n"));
    }

    #[tokio::test]
    async fn short_body_is_forwarded_partially() {
        let req = descriptor(&[
            ("PATH_INFO", "/api/upload"),
            ("REQUEST_METHOD", "PUT"),
            ("CONTENT_LENGTH", "100"),
        ]);
        let (forwarded, wire) = send(&req, b"only-ten!!").await;

        assert_eq!(forwarded, 10);
        assert!(wire.ends_with(b"\r\n\r\nonly-ten!!"));
    }

    #[tokio::test]
    async fn large_body_spans_chunks() {
        let body = vec![b'z'; CHUNK_SIZE * 2 + 17];
        let len = body.len().to_string();
        let req = descriptor(&[
            ("PATH_INFO", "/api/blob"),
            ("REQUEST_METHOD", "POST"),
            ("CONTENT_LENGTH", len.as_str()),
        ]);
        let (forwarded, wire) = send(&req, &body).await;

        assert_eq!(forwarded, body.len() as u64);
        assert!(wire.ends_with(&body));
    }

    #[tokio::test]
    async fn no_declared_length_sends_no_body() {
        let req = descriptor(&[("PATH_INFO", "/api/x"), ("REQUEST_METHOD", "POST")]);
        let (forwarded, wire) = send(&req, b"ignored").await;

        assert_eq!(forwarded, 0);
        assert!(wire.ends_with(b"Connection: close\r\n\r\n"));
    }
}
