//! Rendering collaborators: the styled layout engine and the PDF engine.
//!
//! Both are external processes, one per request. A request acquires a scoped
//! rendering workspace, runs the subprocess under a bounded timeout, and
//! releases the workspace on every exit path; `kill_on_drop` reaps a child
//! that outlives its request. No retries, no pooling.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// Failures in an external rendering step.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch renderer '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer timed out after {0} seconds")]
    Timeout(u64),

    #[error("renderer exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("renderer produced no output file")]
    MissingOutput,

    #[error("rendering workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

/// High-fidelity DOCX to HTML rendering.
#[async_trait]
pub trait StyledRenderer: Send + Sync {
    async fn render_html(&self, document: &[u8]) -> Result<String, RenderError>;
}

/// HTML to PDF rendering.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Scoped per-request rendering workspace. Dropping the session removes the
/// directory; the explicit `close` reports a cleanup failure without letting
/// it mask the request's own result.
struct RenderSession {
    dir: TempDir,
}

impl RenderSession {
    fn create() -> Result<Self, RenderError> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn close(self) {
        if let Err(err) = self.dir.close() {
            warn!(error = %err, "failed to release rendering workspace");
        }
    }
}

/// Run one renderer subprocess under the configured timeout.
async fn run_bounded(
    mut command: Command,
    program: &Path,
    timeout: Duration,
) -> Result<Output, RenderError> {
    debug!(command = %program.display(), "launching renderer");
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| RenderError::Timeout(timeout.as_secs()))?
        .map_err(|source| RenderError::Launch {
            command: program.display().to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(RenderError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

/// Styled rendering through a headless LibreOffice conversion.
pub struct LibreOfficeRenderer {
    soffice_path: PathBuf,
    timeout: Duration,
}

impl LibreOfficeRenderer {
    pub fn new(soffice_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            soffice_path: soffice_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl StyledRenderer for LibreOfficeRenderer {
    async fn render_html(&self, document: &[u8]) -> Result<String, RenderError> {
        let session = RenderSession::create()?;
        let input = session.path().join("input.docx");
        tokio::fs::write(&input, document).await?;

        let mut command = Command::new(&self.soffice_path);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("html")
            .arg("--outdir")
            .arg(session.path())
            .arg(&input)
            .kill_on_drop(true);
        run_bounded(command, &self.soffice_path, self.timeout).await?;

        let produced = session.path().join("input.html");
        let html = tokio::fs::read_to_string(&produced)
            .await
            .map_err(|_| RenderError::MissingOutput)?;
        session.close();
        Ok(html)
    }
}

/// PDF rendering through headless Chromium's print-to-pdf.
pub struct ChromiumPdfEngine {
    chromium_path: PathBuf,
    timeout: Duration,
}

impl ChromiumPdfEngine {
    pub fn new(chromium_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            chromium_path: chromium_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PdfEngine for ChromiumPdfEngine {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let session = RenderSession::create()?;
        let page = session.path().join("page.html");
        tokio::fs::write(&page, html).await?;
        let out = session.path().join("page.pdf");

        let mut command = Command::new(&self.chromium_path);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--print-to-pdf={}", out.display()))
            .arg(format!("file://{}", page.display()))
            .kill_on_drop(true);
        run_bounded(command, &self.chromium_path, self.timeout).await?;

        let pdf = tokio::fs::read(&out)
            .await
            .map_err(|_| RenderError::MissingOutput)?;
        session.close();
        Ok(pdf)
    }
}
