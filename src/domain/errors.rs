//! Domain error types
//!
//! This module defines the error hierarchy for the anonymizer. Errors are
//! split by the stage of the pipeline that produces them so that the
//! processing loop can decide, per stage, whether a failure drops the
//! message, skips a single field, or aborts startup.
//! No third-party error types leak through the public variants.

use thiserror::Error;

/// Main anonymizer error type
///
/// This is the primary error type used throughout the application.
/// Startup code propagates it; the processing loop logs it and moves on.
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors (startup-fatal)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Broker transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Record decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Record encoding errors
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Field-level redaction errors
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors outside the record codec
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Broker transport errors
///
/// Errors raised by a [`MessageSource`](crate::adapters::MessageSource) or
/// [`MessageSink`](crate::adapters::MessageSink). All of them are transient
/// from the pipeline's point of view.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to create or connect a client
    #[error("Failed to connect to broker: {0}")]
    Connection(String),

    /// Failed to read the next message
    #[error("Could not read message: {0}")]
    Receive(String),

    /// Failed to write a message
    #[error("Could not write message: {0}")]
    Send(String),

    /// The underlying channel or client has been closed
    #[error("Transport closed: {0}")]
    Closed(String),
}

/// Errors raised while turning raw bytes into a record
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid JSON
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// Payload is valid JSON but not an object
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A section required by the topic's policy is absent
    #[error("missing required section '{0}'")]
    MissingSection(String),
}

/// Errors raised while turning a record back into bytes
#[derive(Debug, Error)]
#[error("failed to encode record: {0}")]
pub struct EncodeError(pub String);

/// Errors scoped to a single field of a record
///
/// A field error never drops the record: the field is left as it was and
/// the remaining rules still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field path does not exist in this record
    #[error("field '{0}' is missing")]
    Missing(String),

    /// The field exists but holds an unexpected JSON type
    #[error("field '{path}' expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the field
        path: String,
        /// Expected JSON type
        expected: &'static str,
        /// Actual JSON type
        found: &'static str,
    },

    /// An intermediate segment of the path is not an object
    #[error("cannot descend into '{path}': {found} is not an object")]
    NotAnObject {
        /// Dotted path up to the offending segment
        path: String,
        /// Actual JSON type of that segment
        found: &'static str,
    },
}

impl FieldError {
    /// Whether this error only means the field was absent
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldError::Missing(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnonymizerError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizerError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from Kafka client errors
impl From<rdkafka::error::KafkaError> for TransportError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        TransportError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymizer_error_display() {
        let err = AnonymizerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_transport_error_conversion() {
        let transport_err = TransportError::Send("broker down".to_string());
        let err: AnonymizerError = transport_err.into();
        assert!(matches!(err, AnonymizerError::Transport(_)));
        assert_eq!(
            err.to_string(),
            "Transport error: Could not write message: broker down"
        );
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: AnonymizerError = DecodeError::NotAnObject("array").into();
        assert!(matches!(err, AnonymizerError::Decode(_)));
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::TypeMismatch {
            path: "user_dn".to_string(),
            expected: "string",
            found: "number",
        };
        assert_eq!(err.to_string(), "field 'user_dn' expected string, found number");
        assert!(!err.is_missing());
        assert!(FieldError::Missing("user_dn".to_string()).is_missing());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AnonymizerError = io_err.into();
        assert!(matches!(err, AnonymizerError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AnonymizerError = json_err.into();
        assert!(matches!(err, AnonymizerError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AnonymizerError = toml_err.into();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &AnonymizerError::Validation("x".to_string());
        let _: &dyn std::error::Error = &TransportError::Receive("x".to_string());
        let _: &dyn std::error::Error = &EncodeError("x".to_string());
    }
}
