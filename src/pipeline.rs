//! Generation pipeline: validate, stamp, persist, render, export, notify.
//!
//! A record counts as generated once it is persisted. Export runs afterwards, so
//! an export failure leaves a persisted record without a file (and, for bills, a
//! consumed receipt number). Neither is rolled back. Notification runs last and
//! cannot change the outcome.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::generators::common::{notice_filename, receipt_filename};
use crate::generators::validation::{ValidationErrors, ValidationPolicy};
use crate::generators::{
    ExportError, ExportedDocument, Exporter, RenderedDocument, TemplateRenderer, Validator,
};
use crate::models::{Bill, BillForm, DocumentKind, GeneratedRecord, Notice, NoticeForm};
use crate::notify::Notifier;
use crate::storage::{CounterStore, RecordStore, StorageError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("another document is being generated")]
    Busy,
    #[error("failed to persist record: {0}")]
    Storage(#[from] StorageError),
    /// The record was persisted but no file was produced.
    #[error("{} {} was saved but could not be exported: {source}", .record.kind(), .record.id())]
    Export {
        record: Box<GeneratedRecord>,
        #[source]
        source: ExportError,
    },
}

/// Form state for one generation request.
#[derive(Debug, Clone)]
pub enum GenerateRequest {
    Notice(NoticeForm),
    Bill(BillForm),
}

impl GenerateRequest {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Notice(_) => DocumentKind::Notice,
            Self::Bill(_) => DocumentKind::Bill,
        }
    }
}

/// A finished generation: the persisted record and its exported file.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub record: GeneratedRecord,
    pub document: ExportedDocument,
}

pub struct GenerationPipeline {
    counter: Arc<dyn CounterStore>,
    records: Arc<dyn RecordStore>,
    renderer: TemplateRenderer,
    exporter: Arc<dyn Exporter>,
    notifier: Arc<dyn Notifier>,
    policy: ValidationPolicy,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a generation ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GenerationPipeline {
    pub fn new(
        counter: Arc<dyn CounterStore>,
        records: Arc<dyn RecordStore>,
        renderer: TemplateRenderer,
        exporter: Arc<dyn Exporter>,
        notifier: Arc<dyn Notifier>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            counter,
            records,
            renderer,
            exporter,
            notifier,
            policy,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Build a pipeline whose counter and history live in the same store.
    pub fn with_store<S>(
        store: Arc<S>,
        renderer: TemplateRenderer,
        exporter: Arc<dyn Exporter>,
        notifier: Arc<dyn Notifier>,
        policy: ValidationPolicy,
    ) -> Self
    where
        S: CounterStore + RecordStore + 'static,
    {
        let counter: Arc<dyn CounterStore> = store.clone();
        let records: Arc<dyn RecordStore> = store;
        Self::new(counter, records, renderer, exporter, notifier, policy)
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn counter(&self) -> &Arc<dyn CounterStore> {
        &self.counter
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Whether a generation is currently running.
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn generate_notice(&self, form: NoticeForm) -> Result<GenerationOutcome, GenerateError> {
        self.generate(GenerateRequest::Notice(form)).await
    }

    pub async fn generate_bill(&self, form: BillForm) -> Result<GenerationOutcome, GenerateError> {
        self.generate(GenerateRequest::Bill(form)).await
    }

    /// Run one generation from form state to notified record.
    ///
    /// Rejected with [`GenerateError::Busy`] while another generation is in flight.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationOutcome, GenerateError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Rejected {} generation: another is in flight", request.kind());
            return Err(GenerateError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        // 1. Validate
        let validation = match &request {
            GenerateRequest::Notice(form) => form.validate(&self.policy),
            GenerateRequest::Bill(form) => form.validate(&self.policy),
        };
        validation.map_err(|errors| {
            log::info!("Rejected {} form: {}", request.kind(), errors);
            GenerateError::Validation(errors)
        })?;

        // 2. Stamp and 3. Persist
        let now = Utc::now();
        let (record, filename) = match request {
            GenerateRequest::Notice(form) => {
                let notice = stamp_notice(form, now);
                self.records.append_notice(notice.clone())?;
                let filename = notice_filename(&notice);
                (GeneratedRecord::Notice(notice), filename)
            }
            GenerateRequest::Bill(form) => {
                let receipt_number = self.counter.take()?;
                let bill = stamp_bill(form, receipt_number, now);
                self.records.append_bill(bill.clone())?;
                let filename = receipt_filename(&bill);
                (GeneratedRecord::Bill(bill), filename)
            }
        };
        log::info!("Persisted {} {}", record.kind(), record.id());

        // 4. Render
        let rendered = self.renderer.render(&record);

        // 5. Export
        let document = match self.exporter.export(&rendered, &filename).await {
            Ok(document) => document,
            Err(source) => {
                log::error!(
                    "Export of {} {} failed after it was persisted: {}",
                    record.kind(),
                    record.id(),
                    source
                );
                return Err(GenerateError::Export {
                    record: Box::new(record),
                    source,
                });
            }
        };

        // 6. Notify
        self.notifier.notify(&record).await;

        Ok(GenerationOutcome { record, document })
    }

    /// Render unvalidated notice form state for a live preview.
    pub fn preview_notice(&self, form: &NoticeForm) -> RenderedDocument {
        self.renderer.render_notice(&Notice {
            id: String::new(),
            date: form.date.clone(),
            notice_number: form.notice_number.clone(),
            content: form.content.clone(),
            created_at: DateTime::<Utc>::default(),
        })
    }

    /// Render unvalidated bill form state, showing the receipt number the next
    /// generation would take.
    pub fn preview_bill(&self, form: &BillForm) -> RenderedDocument {
        self.renderer.render_bill(&Bill {
            id: String::new(),
            receipt_number: self.counter.peek().to_string(),
            name: form.name.clone(),
            amount: form.amount,
            received_by: form.received_by.clone(),
            date: form.date.clone(),
            created_at: DateTime::<Utc>::default(),
        })
    }
}

fn record_id(kind: DocumentKind, now: DateTime<Utc>) -> String {
    format!("{}_{}", kind, now.timestamp_micros())
}

fn stamp_notice(form: NoticeForm, now: DateTime<Utc>) -> Notice {
    Notice {
        id: record_id(DocumentKind::Notice, now),
        date: form.date,
        notice_number: form.notice_number,
        content: form.content,
        created_at: now,
    }
}

fn stamp_bill(form: BillForm, receipt_number: u64, now: DateTime<Utc>) -> Bill {
    Bill {
        id: record_id(DocumentKind::Bill, now),
        receipt_number: receipt_number.to_string(),
        name: form.name,
        amount: form.amount,
        received_by: form.received_by,
        date: form.date,
        created_at: now,
    }
}
