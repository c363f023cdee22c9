//! Per-invocation request handling.
//!
//! # Responsibilities
//! - Build the request descriptor from the environment snapshot
//! - Dispatch to the proxy pipeline or the static asset server
//! - Render pre-output failures as a CGI status response
//! - Own the backend connection and close it on every path

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;

use crate::assets::AssetServer;
use crate::cgi::{write_error, CgiEnv, RequestDescriptor};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::write_request;
use crate::http::response::relay_response;
use crate::net::BackendConnection;
use crate::observability::RequestId;
use crate::resilience::IoTimeouts;
use crate::routing::{Route, Router};

/// Handles exactly one request per call.
pub struct Gateway {
    config: GatewayConfig,
    router: Router,
    assets: AssetServer,
    timeouts: IoTimeouts,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let router = Router::from_config(&config.routing);
        let assets = AssetServer::from_config(&config.assets);
        let timeouts = IoTimeouts::from(&config.timeouts);
        Self {
            config,
            router,
            assets,
            timeouts,
        }
    }

    /// Serve the request described by `env`.
    ///
    /// `input` is the request body stream and `output` receives the CGI
    /// response. The only error returned is a failure of `output` itself.
    pub async fn handle<I, O>(
        &self,
        env: &CgiEnv,
        input: &mut I,
        output: &mut O,
    ) -> std::io::Result<()>
    where
        I: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let request = RequestDescriptor::from_env(env, &self.config.routing.script_name);
        let span = tracing::info_span!(
            "request",
            request_id = %RequestId::new(),
            method = %request.method,
            path = %request.path,
        );

        self.dispatch(&request, input, output).instrument(span).await
    }

    async fn dispatch<I, O>(
        &self,
        request: &RequestDescriptor,
        input: &mut I,
        output: &mut O,
    ) -> std::io::Result<()>
    where
        I: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let route = self.router.route(&request.path);
        tracing::debug!(?route, "Route selected");

        let result = match route {
            Route::Proxy => self.proxy(request, input, output).await,
            Route::Static => self.assets.serve(&request.path, output).await,
        };

        match result {
            Ok(()) => Ok(()),
            // headers may already be out; nothing sensible left to send
            Err(GatewayError::Io(e)) => {
                tracing::error!(error = %e, "Writing response failed");
                Err(e)
            }
            Err(err) => {
                match &err {
                    GatewayError::Forbidden | GatewayError::NotFound { .. } => {
                        tracing::warn!(error = %err, status = %err.status(), "Request rejected");
                    }
                    _ => tracing::error!(error = %err, status = %err.status(), "Request failed"),
                }
                write_error(output, &err).await
            }
        }
    }

    async fn proxy<I, O>(
        &self,
        request: &RequestDescriptor,
        input: &mut I,
        output: &mut O,
    ) -> Result<(), GatewayError>
    where
        I: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut conn = BackendConnection::connect(&self.config.backend, self.timeouts).await?;
        let host = self.config.backend.host_header();

        // A failed write still lets the backend answer (e.g. an early 413),
        // so the response is relayed regardless.
        match write_request(&mut conn, request, &host, input).await {
            Ok(body_bytes) => tracing::debug!(body_bytes, "Request forwarded to backend"),
            Err(e) => tracing::warn!(error = %e, "Writing request to backend failed"),
        }

        let relayed = relay_response(&mut conn, output).await;
        conn.close().await;

        let report = relayed?;
        tracing::debug!(
            outcome = ?report.outcome,
            bytes_out = report.bytes_out,
            "Backend response relayed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn traversal_rejected_without_touching_backend() {
        let mut config = GatewayConfig::default();
        // would be refused if the proxy branch ran
        config.backend.port = 1;
        let gateway = Gateway::new(config);

        let env = CgiEnv::from_pairs([("PATH_INFO", "/assets/../../etc/passwd")]);
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        gateway.handle(&env, &mut input, &mut output).await.unwrap();

        assert_eq!(output, b"Status: 403 Forbidden\r\n\r\nAccess Denied");
    }
}
