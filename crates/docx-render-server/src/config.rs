use std::path::PathBuf;

use clap::Parser;

/// Configuration for the docx-render server.
#[derive(Parser, Debug, Clone)]
#[command(name = "docx-render-server")]
#[command(about = "DOCX to HTML and HTML to PDF conversion service with merge-field preservation")]
pub struct Config {
    /// TCP host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// TCP port to bind to
    #[arg(long, default_value = "10000", env = "PORT")]
    pub port: u16,

    /// LibreOffice binary used for styled DOCX rendering
    #[arg(long, default_value = "soffice", env = "SOFFICE_PATH")]
    pub soffice_path: PathBuf,

    /// Chromium binary used for PDF rendering
    #[arg(long, default_value = "chromium", env = "CHROMIUM_PATH")]
    pub chromium_path: PathBuf,

    /// Upper bound on a single rendering subprocess (seconds)
    #[arg(long, default_value = "60", env = "RENDER_TIMEOUT_SECS")]
    pub render_timeout_secs: u64,
}
