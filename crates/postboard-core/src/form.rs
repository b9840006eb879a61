//! Draft form state
//!
//! Holds the values being edited, per-field errors and the last
//! submission error. Controllers reset the form after a successful
//! submit and leave the draft untouched on failure.

use crate::error::BoardError;
use crate::validation::FieldErrors;

/// Editable draft plus its error state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState<D> {
    /// Current draft values
    pub draft: D,
    /// Per-field errors from the last submit
    pub field_errors: FieldErrors,
    /// Top-level error from the last submit
    pub submit_error: Option<String>,
    /// A submission is in flight
    pub submitting: bool,
}

impl<D: Default> FormState<D> {
    /// Create empty form
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: D::default(),
            field_errors: FieldErrors::new(),
            submit_error: None,
            submitting: false,
        }
    }

    /// Restore the default draft and clear all errors
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Replace the draft, keeping recorded errors
    pub fn set_draft(&mut self, draft: D) {
        self.draft = draft;
    }

    /// Mark a submission as started
    pub(crate) fn begin_submit(&mut self) {
        self.field_errors = FieldErrors::new();
        self.submit_error = None;
        self.submitting = true;
    }

    /// Record a failed submission
    ///
    /// Field errors land on `field_errors`; everything else becomes the
    /// top-level message.
    pub(crate) fn fail_submit(&mut self, error: &BoardError) {
        self.submitting = false;
        match error.field_errors() {
            Some(errors) => self.field_errors = errors.clone(),
            None => self.submit_error = Some(error.to_string()),
        }
    }

    /// Check if any error is recorded
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty() || self.submit_error.is_some()
    }
}
