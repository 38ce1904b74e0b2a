//! HTTP handlers for the conversion service.
//!
//! Implements:
//! - POST /convert-document - base64 DOCX in, reconciled HTML out
//! - POST /generate-pdf - literal HTML in, PDF out
//! - GET /health - health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use docx_render_core::{assemble_document, extract_fragment, reconcile};

use crate::error::ApiError;
use crate::render::{PdfEngine, StyledRenderer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub styled_renderer: Arc<dyn StyledRenderer>,
    pub pdf_engine: Arc<dyn PdfEngine>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
}

/// GET /health - Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Caller-selected response shape. `html`/`pdf` mean the raw payload;
/// `json` wraps it in the success envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Pdf,
    Json,
}

#[derive(Deserialize)]
pub struct ConvertDocumentRequest {
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default = "default_document_output")]
    pub output: OutputFormat,
}

fn default_document_output() -> OutputFormat {
    OutputFormat::Html
}

#[derive(Deserialize)]
pub struct GeneratePdfRequest {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default = "default_pdf_output")]
    pub output: OutputFormat,
}

fn default_pdf_output() -> OutputFormat {
    OutputFormat::Pdf
}

/// Success envelope for `output=json`.
#[derive(Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
}

/// POST /convert-document.
///
/// Runs the token-faithful extractor and the styled renderer concurrently,
/// reconciles the two renderings, and assembles the final document.
pub async fn convert_document_handler(
    State(state): State<AppState>,
    Json(request): Json<ConvertDocumentRequest>,
) -> Result<Response, ApiError> {
    let encoded = request
        .document
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingDocument)?;
    let document = BASE64.decode(encoded).map_err(ApiError::InvalidBase64)?;

    let request_id = Uuid::new_v4();
    info!(%request_id, bytes = document.len(), "converting document");

    // The two renderings have no ordering dependency on each other; the
    // reconciler joins on both.
    let extraction = {
        let document = document.clone();
        tokio::task::spawn_blocking(move || extract_fragment(&document))
    };
    let styled = state.styled_renderer.render_html(&document);
    let (extracted, styled_html) = tokio::join!(extraction, styled);

    let extractor_fragment = extracted
        .map_err(|err| ApiError::Internal(format!("extraction task failed: {err}")))??;
    let styled_html = styled_html.map_err(ApiError::StyledRender)?;

    let outcome = reconcile(&extractor_fragment, &styled_html);
    info!(
        %request_id,
        strategy = ?outcome.strategy,
        tokens = outcome.token_count,
        trace = %serde_json::to_string(&outcome.trace).unwrap_or_default(),
        "document reconciled"
    );

    let html = assemble_document(&outcome.html, &outcome.style_sheet);
    Ok(match request.output {
        OutputFormat::Json => Json(SuccessEnvelope {
            success: true,
            html: Some(html),
            pdf: None,
        })
        .into_response(),
        _ => Html(html).into_response(),
    })
}

/// POST /generate-pdf.
pub async fn generate_pdf_handler(
    State(state): State<AppState>,
    Json(request): Json<GeneratePdfRequest>,
) -> Result<Response, ApiError> {
    let html = request
        .html
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingHtml)?;

    let request_id = Uuid::new_v4();
    info!(%request_id, bytes = html.len(), "rendering PDF");

    let pdf = state
        .pdf_engine
        .render_pdf(html)
        .await
        .map_err(ApiError::PdfRender)?;
    info!(%request_id, bytes = pdf.len(), "PDF rendered");

    Ok(match request.output {
        OutputFormat::Json => Json(SuccessEnvelope {
            success: true,
            html: None,
            pdf: Some(BASE64.encode(&pdf)),
        })
        .into_response(),
        _ => ([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response(),
    })
}
