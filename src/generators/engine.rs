//! HTML to PDF export engine.
//!
//! Handles the low-level details of writing rendered HTML to a temporary file,
//! invoking the external converter, checking its output, and placing the finished
//! PDF in the output directory.

use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use thiserror::Error;
use tokio::process::Command;

use super::common::{is_pdf, sanitize_filename};
use super::RenderedDocument;
use crate::config::{PdfEngineConfig, PdfEngineKind};

const SOURCE_FILE: &str = "document.html";
const OUTPUT_FILE: &str = "document.pdf";

/// Errors that can occur while exporting a rendered document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF converter '{0}' is not available in this environment")]
    EnvironmentUnsupported(String),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("PDF converter execution failed: {0}")]
    ConverterIo(#[source] std::io::Error),
    #[error("PDF converter did not finish within {0:?}")]
    Timeout(Duration),
    #[error("PDF converter exited with status {code}: {stderr}")]
    ConverterExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("converter output is not a PDF document")]
    InvalidOutput,
    #[error("failed to store exported file at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Name derived from the record fields.
    pub filename: String,
    /// Name of the file actually written; equals `filename` unless it had to be sanitized.
    pub stored_as: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Turns a rendered page into a downloadable file.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(
        &self,
        document: &RenderedDocument,
        filename: &str,
    ) -> Result<ExportedDocument, ExportError>;
}

/// Exporter that shells out to wkhtmltopdf or headless Chromium.
pub struct HtmlPdfEngine {
    config: PdfEngineConfig,
    output_dir: PathBuf,
}

impl HtmlPdfEngine {
    pub fn new(config: PdfEngineConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Converter arguments for a single borderless A4 page.
    fn converter_args(&self, source: &Path, output: &Path) -> Vec<String> {
        let source = source.to_string_lossy().into_owned();
        let output = output.to_string_lossy().into_owned();

        match self.config.kind {
            PdfEngineKind::Wkhtmltopdf => vec![
                "--quiet".into(),
                "--page-size".into(),
                "A4".into(),
                "--orientation".into(),
                "Portrait".into(),
                "--margin-top".into(),
                "0".into(),
                "--margin-bottom".into(),
                "0".into(),
                "--margin-left".into(),
                "0".into(),
                "--margin-right".into(),
                "0".into(),
                "--disable-smart-shrinking".into(),
                "--enable-local-file-access".into(),
                source,
                output,
            ],
            PdfEngineKind::Chromium => vec![
                "--headless".into(),
                "--disable-gpu".into(),
                "--no-sandbox".into(),
                "--no-pdf-header-footer".into(),
                format!("--print-to-pdf={output}"),
                source,
            ],
        }
    }

    async fn compile(&self, temp_dir: &TempDir) -> Result<Vec<u8>, ExportError> {
        let source = temp_dir.path().join(SOURCE_FILE);
        let output = temp_dir.path().join(OUTPUT_FILE);

        // The child dies with the future, whether it times out or the request is dropped.
        let mut command = Command::new(&self.config.binary);
        command
            .args(self.converter_args(&source, &output))
            .current_dir(temp_dir.path())
            .kill_on_drop(true);

        let timeout = self.config.timeout;
        let result = match tokio::time::timeout(timeout, command.output()).await {
            Err(_) => {
                log::error!(
                    "{} did not finish within {:?}, killed",
                    self.config.binary,
                    timeout
                );
                return Err(ExportError::Timeout(timeout));
            }
            Ok(Ok(result)) => result,
            Ok(Err(e))
                if e.kind() == ErrorKind::NotFound || e.kind() == ErrorKind::PermissionDenied =>
            {
                return Err(ExportError::EnvironmentUnsupported(
                    self.config.binary.clone(),
                ))
            }
            Ok(Err(e)) => return Err(ExportError::ConverterIo(e)),
        };

        if !result.status.success() {
            return Err(ExportError::ConverterExit {
                code: result.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let pdf = fs::read(&output).map_err(ExportError::ReadPdf)?;
        if !is_pdf(&pdf) {
            return Err(ExportError::InvalidOutput);
        }
        Ok(pdf)
    }
}

#[async_trait]
impl Exporter for HtmlPdfEngine {
    async fn export(
        &self,
        document: &RenderedDocument,
        filename: &str,
    ) -> Result<ExportedDocument, ExportError> {
        let temp_dir = tempdir().map_err(ExportError::TempDir)?;
        fs::write(temp_dir.path().join(SOURCE_FILE), &document.html)
            .map_err(ExportError::WriteSource)?;

        log::debug!(
            "Converting {} document with {}",
            document.kind,
            self.config.binary
        );
        let pdf = self.compile(&temp_dir).await?;

        store_file(&self.output_dir, filename, &pdf)
    }
}

/// Write exported bytes into `dir` under a sanitized version of `filename`.
pub fn store_file(dir: &Path, filename: &str, data: &[u8]) -> Result<ExportedDocument, ExportError> {
    let stored_as = sanitize_filename(filename, "document.pdf");
    let path = dir.join(&stored_as);

    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, data))
        .map_err(|source| ExportError::Store {
            path: path.clone(),
            source,
        })?;

    log::info!("Exported {} ({} bytes)", path.display(), data.len());

    Ok(ExportedDocument {
        filename: filename.to_string(),
        stored_as,
        path,
        size: data.len() as u64,
    })
}
