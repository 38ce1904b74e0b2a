//! Error types for the HTTP service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use docx_render_core::ExtractError;

use crate::render::RenderError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTML content is required")]
    MissingHtml,

    #[error("Document content is required")]
    MissingDocument,

    #[error("Invalid base64 document payload")]
    InvalidBase64(#[source] base64::DecodeError),

    #[error("Failed to extract document text")]
    Extraction(#[from] ExtractError),

    #[error("Failed to convert document")]
    StyledRender(#[source] RenderError),

    #[error("Failed to generate PDF")]
    PdfRender(#[source] RenderError),

    #[error("Internal error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            success: bool,
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = match &self {
            ApiError::MissingHtml | ApiError::MissingDocument | ApiError::InvalidBase64(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Extraction(_)
            | ApiError::StyledRender(_)
            | ApiError::PdfRender(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &self {
            ApiError::InvalidBase64(err) => Some(err.to_string()),
            ApiError::Extraction(err) => Some(err.to_string()),
            ApiError::StyledRender(err) | ApiError::PdfRender(err) => Some(err.to_string()),
            ApiError::Internal(message) => Some(message.clone()),
            ApiError::MissingHtml | ApiError::MissingDocument => None,
        };

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}
