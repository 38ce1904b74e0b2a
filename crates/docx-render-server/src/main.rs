//! docx-render HTTP service.
//!
//! Converts DOCX documents to HTML while keeping `{{merge.field}}`
//! placeholders intact through the styled rendering pipeline, and renders
//! literal HTML to PDF. One rendering session per request, no shared state.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docx_render_server::config::Config;
use docx_render_server::handlers::AppState;
use docx_render_server::render::{ChromiumPdfEngine, LibreOfficeRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("Starting docx-render-server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Host: {}", config.host);
    info!("  Port: {}", config.port);
    info!("  Styled renderer: {}", config.soffice_path.display());
    info!("  PDF engine: {}", config.chromium_path.display());
    info!("  Render timeout: {}s", config.render_timeout_secs);

    let timeout = Duration::from_secs(config.render_timeout_secs);
    let state = AppState {
        styled_renderer: Arc::new(LibreOfficeRenderer::new(&config.soffice_path, timeout)),
        pdf_engine: Arc::new(ChromiumPdfEngine::new(&config.chromium_path, timeout)),
    };

    let app = docx_render_server::app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        info!("Received SIGTERM, initiating shutdown");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
