//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

use ngo_docs_server::config::{OrganizationProfile, ReceivedByOptions};
use ngo_docs_server::generators::engine::store_file;
use ngo_docs_server::generators::{
    ExportError, ExportedDocument, Exporter, RenderedDocument, TemplateRenderer, ValidationPolicy,
};
use ngo_docs_server::models::{BillForm, NoticeForm};
use ngo_docs_server::notify::{
    EmailMessage, EmailNotifier, NotificationPayload, NotificationTransport, NotifyError,
};
use ngo_docs_server::pipeline::GenerationPipeline;
use ngo_docs_server::storage::MemoryStore;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%fake\n";

/// Exporter that writes a fixed PDF body into a temporary directory.
pub struct FakeExporter {
    dir: TempDir,
    pub exported: Mutex<Vec<RenderedDocument>>,
}

impl FakeExporter {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            exported: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

#[async_trait]
impl Exporter for FakeExporter {
    async fn export(
        &self,
        document: &RenderedDocument,
        filename: &str,
    ) -> Result<ExportedDocument, ExportError> {
        self.exported.lock().push(document.clone());
        store_file(self.dir.path(), filename, PDF_BYTES)
    }
}

/// Exporter for an environment with no converter.
pub struct UnsupportedExporter;

#[async_trait]
impl Exporter for UnsupportedExporter {
    async fn export(
        &self,
        _document: &RenderedDocument,
        _filename: &str,
    ) -> Result<ExportedDocument, ExportError> {
        Err(ExportError::EnvironmentUnsupported("wkhtmltopdf".to_string()))
    }
}

/// Exporter that parks until released, to hold a generation in flight.
pub struct GatedExporter {
    pub started: Notify,
    pub release: Notify,
    inner: FakeExporter,
}

impl GatedExporter {
    pub fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            inner: FakeExporter::new(),
        }
    }
}

#[async_trait]
impl Exporter for GatedExporter {
    async fn export(
        &self,
        document: &RenderedDocument,
        filename: &str,
    ) -> Result<ExportedDocument, ExportError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.export(document, filename).await
    }
}

/// Transport that keeps every message it is given.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(EmailMessage, NotificationPayload)>>,
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send(
        &self,
        message: &EmailMessage,
        payload: &NotificationPayload,
    ) -> Result<(), NotifyError> {
        self.sent.lock().push((message.clone(), payload.clone()));
        Ok(())
    }
}

/// Transport whose every delivery fails.
pub struct FailingTransport;

#[async_trait]
impl NotificationTransport for FailingTransport {
    async fn send(
        &self,
        _message: &EmailMessage,
        _payload: &NotificationPayload,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("relay unreachable".to_string()))
    }
}

pub fn organization() -> OrganizationProfile {
    OrganizationProfile {
        name: "Helping Hands Foundation".to_string(),
        address: "12 Lake Road, Kolkata".to_string(),
        contact: "+91 98300 00000".to_string(),
        email: "office@helpinghands.example".to_string(),
        asset_base_url: "https://helpinghands.example".to_string(),
    }
}

pub fn policy() -> ValidationPolicy {
    ValidationPolicy::new(ReceivedByOptions::new(["President", "Treasurer"]).expect("receivers"))
}

pub fn build_pipeline(
    store: Arc<MemoryStore>,
    exporter: Arc<dyn Exporter>,
    transport: Arc<dyn NotificationTransport>,
) -> GenerationPipeline {
    let notifier = Arc::new(EmailNotifier::new(
        transport,
        "office@helpinghands.example",
        "alerts@helpinghands.example",
    ));
    GenerationPipeline::with_store(
        store,
        TemplateRenderer::new(organization()),
        exporter,
        notifier,
        policy(),
    )
}

pub fn notice_form() -> NoticeForm {
    NoticeForm {
        date: "01.01.2026".to_string(),
        notice_number: "NTC00001".to_string(),
        content: "<p>General body meeting on Sunday.</p>".to_string(),
    }
}

pub fn bill_form() -> BillForm {
    BillForm {
        name: "A. Rahman".to_string(),
        amount: 5000.0,
        received_by: "Treasurer".to_string(),
        date: "01.01.2026".to_string(),
    }
}
