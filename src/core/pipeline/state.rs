//! Pipeline states and per-message outcomes

use crate::anonymization::RedactionReport;
use crate::domain::errors::{DecodeError, EncodeError};
use std::fmt;

/// Step of the receive/redact/publish cycle
///
/// `Idle → Receiving → Decoding → Redacting → Encoding → Publishing → Idle`.
/// `Draining` and `Stopped` are reached only through cancellation or a
/// closed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Between messages
    #[default]
    Idle,
    /// Waiting on the source
    Receiving,
    /// Parsing the payload
    Decoding,
    /// Applying the topic's rules
    Redacting,
    /// Serializing the redacted record
    Encoding,
    /// Waiting on the sink's acknowledgment
    Publishing,
    /// Flushing the sink after cancellation
    Draining,
    /// Loop exited
    Stopped,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Receiving => "receiving",
            PipelineState::Decoding => "decoding",
            PipelineState::Redacting => "redacting",
            PipelineState::Encoding => "encoding",
            PipelineState::Publishing => "publishing",
            PipelineState::Draining => "draining",
            PipelineState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Why a message will not be published
#[derive(Debug)]
pub enum DropReason {
    /// Payload was not a usable JSON record
    Decode(DecodeError),
    /// Redacted record could not be serialized
    Encode(EncodeError),
    /// Topic has no policy and unknown topics are rejected
    RejectedTopic(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Decode(e) => write!(f, "{e}"),
            DropReason::Encode(e) => write!(f, "{e}"),
            DropReason::RejectedTopic(schema) => write!(f, "no policy for schema '{schema}'"),
        }
    }
}

/// Result of one pass from decoding to encoding
#[derive(Debug)]
pub enum StepOutcome {
    /// Topic rules were applied; `payload` is ready to publish
    Redacted {
        /// Encoded record
        payload: Vec<u8>,
        /// What each rule did
        report: RedactionReport,
    },
    /// Topic has no policy; `payload` is the re-encoded, unmodified record
    PassedThrough {
        /// Encoded record
        payload: Vec<u8>,
    },
    /// Message will not be published
    Dropped(DropReason),
}

impl StepOutcome {
    /// Encoded record, if the message is publishable
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            StepOutcome::Redacted { payload, .. } | StepOutcome::PassedThrough { payload } => {
                Some(payload)
            }
            StepOutcome::Dropped(_) => None,
        }
    }

    /// Take the encoded record, if the message is publishable
    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self {
            StepOutcome::Redacted { payload, .. } | StepOutcome::PassedThrough { payload } => {
                Some(payload)
            }
            StepOutcome::Dropped(_) => None,
        }
    }

    /// Redaction report, present only when rules were applied
    pub fn report(&self) -> Option<&RedactionReport> {
        match self {
            StepOutcome::Redacted { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::default().to_string(), "idle");
        assert_eq!(PipelineState::Publishing.to_string(), "publishing");
    }

    #[test]
    fn test_outcome_payload() {
        let outcome = StepOutcome::PassedThrough {
            payload: b"{}".to_vec(),
        };
        assert_eq!(outcome.payload(), Some(&b"{}"[..]));
        assert!(outcome.report().is_none());

        let reason = DropReason::RejectedTopic("t".to_string());
        assert_eq!(reason.to_string(), "no policy for schema 't'");

        let dropped = StepOutcome::Dropped(reason);
        assert!(dropped.report().is_none());
        assert!(dropped.into_payload().is_none());
    }
}
