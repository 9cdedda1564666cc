//! Traits for form validation.

use super::validation::{ValidationErrors, ValidationPolicy};

/// Trait for validating submitted form state.
pub trait Validator {
    /// Check every field, collecting all problems rather than stopping at the first.
    fn validate(&self, policy: &ValidationPolicy) -> Result<(), ValidationErrors>;
}
