//! Pipeline summary and reporting
//!
//! Counters accumulated while the pipeline runs, reported when it stops.

use crate::core::pipeline::state::{DropReason, StepOutcome};
use std::time::Duration;

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Messages delivered by the source
    pub received: usize,

    /// Messages acknowledged by the sink
    pub published: usize,

    /// Messages redacted and ready to publish (published or not)
    pub redacted: usize,

    /// Messages from topics without a policy, forwarded unmodified
    pub passed_through: usize,

    /// Messages dropped because they could not be decoded
    pub decode_failures: usize,

    /// Messages dropped because they could not be re-encoded
    pub encode_failures: usize,

    /// Messages dropped because their topic has no policy
    pub rejected: usize,

    /// Messages the sink did not acknowledge
    pub publish_failures: usize,

    /// Failed reads
    pub receive_errors: usize,

    /// Polls that waited the full timeout without a message
    pub idle_polls: usize,

    /// Fields replaced by their digest
    pub fields_hashed: usize,

    /// Fields removed
    pub fields_dropped: usize,

    /// Fields named by a rule but absent
    pub fields_missing: usize,

    /// Fields left unredacted because of their type
    pub field_mismatches: usize,

    /// Wall time of the run
    pub duration: Duration,
}

impl PipelineSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count the result of processing one message
    pub fn record_outcome(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Redacted { report, .. } => {
                self.redacted += 1;
                self.fields_hashed += report.hashed.len();
                self.fields_dropped += report.dropped.len();
                self.fields_missing += report.missing.len();
                self.field_mismatches += report.mismatches.len();
            }
            StepOutcome::PassedThrough { .. } => self.passed_through += 1,
            StepOutcome::Dropped(DropReason::Decode(_)) => self.decode_failures += 1,
            StepOutcome::Dropped(DropReason::Encode(_)) => self.encode_failures += 1,
            StepOutcome::Dropped(DropReason::RejectedTopic(_)) => self.rejected += 1,
        }
    }

    /// Messages dropped before publishing, for any reason
    pub fn dropped(&self) -> usize {
        self.decode_failures + self.encode_failures + self.rejected
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            received = self.received,
            published = self.published,
            redacted = self.redacted,
            passed_through = self.passed_through,
            dropped = self.dropped(),
            idle_polls = self.idle_polls,
            duration_secs = self.duration.as_secs(),
            "Pipeline stopped"
        );

        if self.dropped() > 0 || self.publish_failures > 0 || self.receive_errors > 0 {
            tracing::warn!(
                decode_failures = self.decode_failures,
                encode_failures = self.encode_failures,
                rejected = self.rejected,
                publish_failures = self.publish_failures,
                receive_errors = self.receive_errors,
                "Pipeline stopped with failures"
            );
        }

        if self.field_mismatches > 0 {
            tracing::warn!(
                field_mismatches = self.field_mismatches,
                "Some fields were left unredacted because of their type"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::RedactionReport;
    use crate::domain::errors::{DecodeError, FieldError};

    #[test]
    fn test_record_outcome() {
        let mut summary = PipelineSummary::new();

        let report = RedactionReport {
            hashed: vec!["data.user_dn".to_string()],
            mismatches: vec![FieldError::TypeMismatch {
                path: "data.user".to_string(),
                expected: "string",
                found: "null",
            }],
            ..RedactionReport::default()
        };
        summary.record_outcome(&StepOutcome::Redacted {
            payload: vec![],
            report,
        });
        summary.record_outcome(&StepOutcome::PassedThrough { payload: vec![] });
        summary.record_outcome(&StepOutcome::Dropped(DropReason::Decode(
            DecodeError::NotAnObject("array"),
        )));
        summary.record_outcome(&StepOutcome::Dropped(DropReason::RejectedTopic(
            "other".to_string(),
        )));

        assert_eq!(summary.redacted, 1);
        assert_eq!(summary.fields_hashed, 1);
        assert_eq!(summary.field_mismatches, 1);
        assert_eq!(summary.passed_through, 1);
        assert_eq!(summary.decode_failures, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.dropped(), 2);
    }
}
