//! Generators module - turns records into printable documents.
//!
//! - `validation` - field checks run before anything is stamped
//! - `templates` - pure HTML rendering of notices and receipts on an A4 page
//! - `engine` - conversion of rendered HTML into a one-page PDF file
//! - `common` - filename, padding, and formatting rules shared by the above

pub mod common;
pub mod engine;
pub mod templates;
pub mod traits;
pub mod validation;

pub use engine::{ExportError, ExportedDocument, Exporter, HtmlPdfEngine};
pub use templates::TemplateRenderer;
pub use traits::Validator;
pub use validation::{ValidationError, ValidationErrors, ValidationPolicy};

use crate::models::DocumentKind;

/// A document rendered to print-ready HTML, not yet exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub html: String,
}
