//! Cueframe web server.
//!
//! Serves an upload form at `/` and converts posted subtitle files into a
//! ZIP of per-cue frames at `/convert`. The font is resolved once at startup;
//! if that fails and the built-in fallback is disabled the server refuses to
//! start.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cueframe_common::AppConfig;
use cueframe_render_engine::RenderContext;
use tracing::{error, info, warn};

mod routes;

#[derive(Parser)]
#[command(name = "cueframe-server", about = "Subtitle to frames web service", version)]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/cueframe/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host, overriding the config file
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding the config file and PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    cueframe_common::logging::init_logging(&config.logging);

    info!(
        "Initializing {} v{}...",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let ctx = RenderContext::from_app_config(&config).context("Failed to initialize renderer")?;
    if ctx.font_source() == &cueframe_render_engine::FontSource::Builtin {
        warn!("Serving with the built-in box face; uploaded text will not be legible");
    }
    let state = routes::AppState { ctx: Arc::new(ctx) };
    let app = routes::router(state, config.server.max_upload_bytes);

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {bind_addr}"))?;
    let addr = listener.local_addr()?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        address = %addr,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
