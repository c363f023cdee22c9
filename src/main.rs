//! Preview CGI gateway.
//!
//! Installed by the web server as `index.cgi`. Each invocation handles one
//! request and exits.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!     CGI environment      │  ┌──────────┐    ┌──────────┐    ┌────────────┐  │
//!     ─────────────────────┼─▶│   cgi    │───▶│ routing  │───▶│   assets   │──┼──▶ stdout
//!     (+ stdin body)       │  │   env    │    │ resolver │    │   server   │  │
//!                          │  └──────────┘    └────┬─────┘    └────────────┘  │
//!                          │                       │ /api/, /login             │
//!                          │                       ▼                           │
//!                          │  ┌──────────┐    ┌──────────┐    ┌────────────┐  │
//!     stdout  ◀────────────┼──│ response │◀───│   net    │◀───│  request   │  │
//!                          │  │translator│    │ backend  │    │ translator │  │
//!                          │  └──────────┘    └────┬─────┘    └────────────┘  │
//!                          └───────────────────────┼──────────────────────────┘
//!                                                  ▼
//!                                           backend (HTTP/1.1)
//! ```
//!
//! Logs go to stderr. The exit status is always 0; failures are reported
//! through the CGI `Status:` line.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::AsyncWriteExt;

use preview_cgi::cgi::write_error;
use preview_cgi::config::{load_config, GatewayConfig};
use preview_cgi::observability::init_logging;
use preview_cgi::{CgiEnv, Gateway, GatewayError};

#[derive(Parser, Debug)]
#[command(name = "preview-cgi")]
#[command(about = "CGI gateway serving preview assets and proxying API calls", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long, env = "PREVIEW_CGI_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit without handling a request.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A web server may pass query words as arguments; those are not ours.
    let cli = Cli::try_parse().unwrap_or_else(|_| Cli {
        config: std::env::var_os("PREVIEW_CGI_CONFIG").map(PathBuf::from),
        check_config: false,
    });

    let loaded = match &cli.config {
        Some(path) => load_config(path).map_err(GatewayError::from),
        None => Ok(GatewayConfig::default()),
    };

    let fallback = GatewayConfig::default();
    init_logging(&loaded.as_ref().unwrap_or(&fallback).observability);

    if cli.check_config {
        match &loaded {
            Ok(config) => eprintln!(
                "configuration ok: backend {}, asset root {}, proxy prefixes {:?}",
                config.backend.host_header(),
                config.assets.root,
                config.routing.proxy_prefixes
            ),
            Err(e) => eprintln!("{}", e),
        }
        return;
    }

    let mut stdout = tokio::io::stdout();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, path = ?cli.config, "Failed to load configuration");
            if let Err(e) = write_error(&mut stdout, &e).await {
                tracing::error!(error = %e, "Writing error response failed");
            }
            return;
        }
    };

    let env = CgiEnv::from_process();
    let gateway = Gateway::new(config);
    let mut stdin = tokio::io::stdin();

    if let Err(e) = gateway.handle(&env, &mut stdin, &mut stdout).await {
        tracing::error!(error = %e, "Request aborted");
    }
    if let Err(e) = stdout.flush().await {
        tracing::error!(error = %e, "Flushing stdout failed");
    }
}
