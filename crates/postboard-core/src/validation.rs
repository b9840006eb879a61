//! Validation rules for post and comment drafts
//!
//! Pure functions, no network access:
//! - Required-field checks for title and body
//! - Case-insensitive title uniqueness against the current list

use crate::types::{NewComment, NewPost, Post};
use std::collections::BTreeMap;

/// Message surfaced when a title collides with an existing post
pub const DUPLICATE_TITLE_MESSAGE: &str = "a post with this title already exists";

/// Draft fields subject to validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Title field
    Title,
    /// Body field
    Body,
}

impl Field {
    /// Wire/form name of the field
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Body => "body",
        }
    }

    /// Message for a missing value
    #[must_use]
    pub fn required_message(self) -> String {
        format!("the {} field is required", self.name())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping of field to error message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Create empty error set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any previous one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Error for a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// True when no field failed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate failing fields in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (_, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

fn require(errors: &mut FieldErrors, field: Field, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, field.required_message());
    }
}

/// Validate a create-post draft
///
/// Title and body are required; whitespace-only values count as empty.
/// No length limits or content normalization apply.
#[must_use]
pub fn validate_new_post(candidate: &NewPost) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, Field::Title, &candidate.title);
    require(&mut errors, Field::Body, &candidate.body);
    errors
}

/// Validate an add-comment draft (same required-field rules as posts)
#[must_use]
pub fn validate_new_comment(candidate: &NewComment) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, Field::Title, &candidate.title);
    require(&mut errors, Field::Body, &candidate.body);
    errors
}

/// Check the candidate title against every existing post
///
/// Comparison is case-insensitive exact match, with no trimming.
///
/// # Returns
/// - `None` if the title is unused
/// - `Some(message)` if a post with an equal title exists
#[must_use]
pub fn check_title_unique(candidate: &NewPost, existing: &[Post]) -> Option<&'static str> {
    let wanted = candidate.title.to_lowercase();
    existing
        .iter()
        .any(|post| post.title.to_lowercase() == wanted)
        .then_some(DUPLICATE_TITLE_MESSAGE)
}
