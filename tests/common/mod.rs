//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use preview_cgi::config::GatewayConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Start a one-shot mock backend that replies with `response` split into
/// `chunks`, then closes. The handle yields the raw request bytes it saw.
pub async fn start_mock_backend(chunks: Vec<Vec<u8>>) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        for chunk in chunks {
            let _ = socket.write_all(&chunk).await;
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let _ = socket.shutdown().await;
        request
    });

    (addr, handle)
}

/// Read a request head plus as much body as `Content-Length` declares.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];

    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            return request;
        }
        request.extend_from_slice(&buf[..n]);

        if let Some(end) = find(&request, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..end]).to_string();
            let declared = head
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + declared {
                return request;
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Default config pointed at `backend` and an asset directory.
pub fn config_for(backend: SocketAddr, assets: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.host = backend.ip().to_string();
    config.backend.port = backend.port();
    config.assets.root = assets.display().to_string();
    config.assets.fallback_root = assets.display().to_string();
    config.timeouts.read_secs = 2;
    config.timeouts.write_secs = 2;
    config.timeouts.connect_secs = 2;
    config
}
