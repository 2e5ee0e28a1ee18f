//! Per-record redaction outcome

use crate::domain::errors::FieldError;

/// What happened to each rule applied to one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionReport {
    /// Fields replaced by their digest
    pub hashed: Vec<String>,

    /// Fields removed
    pub dropped: Vec<String>,

    /// Fields covered by a `noop` placeholder and left as they were
    pub placeholders: Vec<String>,

    /// Fields named by a rule but absent from the record
    pub missing: Vec<String>,

    /// Fields that could not be redacted because of their type
    pub mismatches: Vec<FieldError>,
}

impl RedactionReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field-level failure
    ///
    /// A missing field is an expected outcome and is tracked separately
    /// from type mismatches.
    pub fn add_error(&mut self, error: FieldError) {
        match error {
            FieldError::Missing(path) => self.missing.push(path),
            other => self.mismatches.push(other),
        }
    }

    /// Number of fields whose value changed
    pub fn fields_changed(&self) -> usize {
        self.hashed.len() + self.dropped.len()
    }

    /// Whether the record left redaction unmodified
    pub fn is_unchanged(&self) -> bool {
        self.fields_changed() == 0
    }

    /// Whether any field failed on a type mismatch
    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }

    /// Total number of rules accounted for
    pub fn rules_seen(&self) -> usize {
        self.fields_changed() + self.placeholders.len() + self.missing.len() + self.mismatches.len()
    }
}
