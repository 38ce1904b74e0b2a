//! HTTP service for document conversion.
//!
//! Endpoints:
//! - POST /convert-document - DOCX (base64) to HTML with merge fields kept intact
//! - POST /generate-pdf - literal HTML to PDF
//! - GET /health - health check

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Request body cap, matching the original service's 20 MB limit.
pub const BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/convert-document", post(handlers::convert_document_handler))
        .route("/generate-pdf", post(handlers::generate_pdf_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
