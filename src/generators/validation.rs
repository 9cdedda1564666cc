//! Input validation for notice and receipt forms.
//!
//! Errors carry the offending field, a readable message, and an optional hint
//! on how to fix it, so the same value can be shown to a person or returned
//! from the API as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::common::has_visible_content;
use super::traits::Validator;
use crate::config::ReceivedByOptions;
use crate::models::{BillForm, NoticeForm};

/// Required length of a notice reference number.
pub const NOTICE_NUMBER_LEN: usize = 8;

/// Validation error with a field name and a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Please fill in the {}", label.to_lowercase()))
    }

    pub fn invalid_notice_number(field: &str, actual: usize) -> Self {
        Self::new(
            field,
            format!(
                "Notice number must be exactly {} characters (got {})",
                NOTICE_NUMBER_LEN, actual
            ),
        )
        .with_suggestion("Use the full reference, e.g. NTC00001")
    }

    pub fn non_positive_amount(field: &str) -> Self {
        Self::new(field, "Amount must be greater than zero")
            .with_suggestion("Enter the donated amount in rupees, e.g. 5000")
    }

    pub fn unknown_receiver(field: &str, value: &str, allowed: &ReceivedByOptions) -> Self {
        Self::new(
            field,
            format!("'{}' is not an authorized receiver", value),
        )
        .with_suggestion(format!("Choose one of: {}", allowed.as_slice().join(", ")))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether a given field failed.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Multi-line summary suitable for showing to a person.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} problem(s) found",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Externally configured constraints the forms are checked against.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub received_by: ReceivedByOptions,
}

impl ValidationPolicy {
    pub fn new(received_by: ReceivedByOptions) -> Self {
        Self { received_by }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate the notice reference: present and exactly `NOTICE_NUMBER_LEN` characters.
pub fn validate_notice_number(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, "Notice number"));
        return;
    }

    let len = value.chars().count();
    if len != NOTICE_NUMBER_LEN {
        errors.add(ValidationError::invalid_notice_number(field, len));
    }
}

/// Validate that editor markup shows something, not just empty paragraphs.
pub fn validate_rich_text(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if !has_visible_content(value) {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_amount(value: f64, field: &str, errors: &mut ValidationErrors) {
    if !value.is_finite() || value <= 0.0 {
        errors.add(ValidationError::non_positive_amount(field));
    }
}

pub fn validate_receiver(
    value: &str,
    field: &str,
    allowed: &ReceivedByOptions,
    errors: &mut ValidationErrors,
) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, "Received by"));
        return;
    }

    if !allowed.contains(value) {
        errors.add(ValidationError::unknown_receiver(field, value, allowed));
    }
}

impl Validator for NoticeForm {
    fn validate(&self, _policy: &ValidationPolicy) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.date, "date", "Date", &mut errors);
        validate_notice_number(&self.notice_number, "noticeNumber", &mut errors);
        validate_rich_text(&self.content, "content", "Notice content", &mut errors);

        errors.into_result()
    }
}

impl Validator for BillForm {
    fn validate(&self, policy: &ValidationPolicy) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.name, "name", "Donor name", &mut errors);
        validate_amount(self.amount, "amount", &mut errors);
        validate_receiver(
            &self.received_by,
            "receivedBy",
            &policy.received_by,
            &mut errors,
        );
        validate_required(&self.date, "date", "Date", &mut errors);

        errors.into_result()
    }
}
