//! Backend connection with per-operation deadlines.
//!
//! # Responsibilities
//! - Resolve and connect to the configured backend address
//! - Bound every read and write by its own timeout
//! - Close the socket once the response has been relayed
//!
//! # Design Decisions
//! - One connection per invocation, never pooled or reused
//! - Read failures and read timeouts both surface as a zero-length read;
//!   the caller treats that as end of response
//! - Generic over the underlying stream so the translators can be driven by
//!   in-memory pipes in tests

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::time::timeout;

use crate::config::BackendConfig;
use crate::error::GatewayError;
use crate::resilience::IoTimeouts;

/// A byte stream whose reads and writes are individually time-limited.
#[derive(Debug)]
pub struct TimedStream<S> {
    inner: S,
    timeouts: IoTimeouts,
    bytes_read: u64,
    bytes_written: u64,
}

/// The outbound connection used by the proxy pipeline.
pub type BackendConnection = TimedStream<TcpStream>;

impl<S> TimedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(inner: S, timeouts: IoTimeouts) -> Self {
        Self {
            inner,
            timeouts,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// Read up to `buf.len()` bytes.
    ///
    /// Returns 0 on end of stream, on read timeout and on read error.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> usize {
        match timeout(self.timeouts.read, self.inner.read(buf)).await {
            Ok(Ok(n)) => {
                self.bytes_read += n as u64;
                n
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Backend read failed, treating as end of stream");
                0
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.timeouts.read, "Backend read timed out");
                0
            }
        }
    }

    /// Write all of `bytes` within the write timeout.
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match timeout(self.timeouts.write, self.inner.write_all(bytes)).await {
            Ok(Ok(())) => {
                self.bytes_written += bytes.len() as u64;
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "backend write timed out",
            )),
        }
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        match timeout(self.timeouts.write, self.inner.flush()).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "backend flush timed out",
            )),
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Shut down the write half and release the stream.
    pub async fn close(mut self) {
        if let Ok(Err(e)) = timeout(self.timeouts.write, self.inner.shutdown()).await {
            tracing::trace!(error = %e, "Backend shutdown failed");
        }
        tracing::trace!(
            bytes_read = self.bytes_read,
            bytes_written = self.bytes_written,
            "Backend connection closed"
        );
    }
}

impl BackendConnection {
    /// Open a fresh connection to the backend.
    ///
    /// Every resolved address is tried in order within one connect timeout.
    /// Address resolution and socket setup failures are `Internal`;
    /// refusal, unreachability and connect timeout are `BadGateway`.
    pub async fn connect(
        config: &BackendConfig,
        timeouts: IoTimeouts,
    ) -> Result<Self, GatewayError> {
        let addrs = resolve(config).await?;

        match timeout(timeouts.connect, connect_any(&addrs)).await {
            Ok(Ok(stream)) => Ok(TimedStream::new(stream, timeouts)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(GatewayError::BadGateway(io::Error::new(
                io::ErrorKind::TimedOut,
                "backend connect timed out",
            ))),
        }
    }
}

async fn resolve(config: &BackendConfig) -> Result<Vec<SocketAddr>, GatewayError> {
    let invalid = || GatewayError::Internal("Invalid address".to_string());

    let addrs: Vec<SocketAddr> = lookup_host((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            tracing::error!(
                backend = %config.host_header(),
                error = %e,
                "Backend address did not resolve"
            );
            invalid()
        })?
        .collect();

    if addrs.is_empty() {
        return Err(invalid());
    }
    Ok(addrs)
}

/// Connect to the first address that accepts.
async fn connect_any(addrs: &[SocketAddr]) -> Result<TcpStream, GatewayError> {
    let mut last_err = None;

    for &addr in addrs {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        };
        let socket = match socket {
            Ok(socket) => socket,
            Err(e) => {
                tracing::error!(backend = %addr, error = %e, "Socket creation failed");
                continue;
            }
        };

        match socket.connect(addr).await {
            Ok(stream) => {
                tracing::debug!(backend = %addr, "Connected to backend");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(backend = %addr, error = %e, "Backend address refused");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(GatewayError::BadGateway(e)),
        None => Err(GatewayError::Internal("Socket creation failed".to_string())),
    }
}
