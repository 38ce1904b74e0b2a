//! Error types for DOCX text extraction.

/// Failures while reading the DOCX package or its document part.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("document is not a valid DOCX package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("DOCX package is missing part '{0}'")]
    MissingPart(&'static str),

    #[error("malformed XML in document part: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to read document part: {0}")]
    Io(#[from] std::io::Error),
}
