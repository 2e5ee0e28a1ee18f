//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, with `RUST_LOG` taking precedence
//! - Local JSON file logging with rotation
//! - Helper macros for the per-message events of the pipeline
//!
//! # Example
//!
//! ```no_run
//! use kafka_anonymizer::logging::init_logging;
//! use kafka_anonymizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a message that was dropped before publishing
///
/// # Example
///
/// ```no_run
/// use kafka_anonymizer::log_message_dropped;
///
/// log_message_dropped!("cmssw_pop_raw_metric", 3, 1042, "malformed JSON");
/// ```
#[macro_export]
macro_rules! log_message_dropped {
    ($topic:expr, $partition:expr, $offset:expr, $reason:expr) => {
        tracing::warn!(
            topic = %$topic,
            partition = $partition,
            offset = $offset,
            reason = %$reason,
            "Failed to anonymize message, dropping it"
        );
    };
}

/// Log a message acknowledged by the output topic
///
/// # Example
///
/// ```no_run
/// use kafka_anonymizer::log_message_published;
///
/// log_message_published!("cmssw_pop_anon_metric", 1_700_000_000_000_000_000i64);
/// ```
#[macro_export]
macro_rules! log_message_published {
    ($topic:expr, $send_id:expr) => {
        tracing::info!(
            topic = %$topic,
            send_id = $send_id,
            "send message"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use kafka_anonymizer::log_error_with_context;
/// use kafka_anonymizer::domain::TransportError;
///
/// let error = TransportError::Receive("broker unavailable".to_string());
/// log_error_with_context!(&error, "Could not read message");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
