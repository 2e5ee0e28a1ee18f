//! Domain types shared across the anonymizer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Error types** ([`AnonymizerError`], [`TransportError`], [`DecodeError`],
//!   [`EncodeError`], [`FieldError`])
//! - **Result type alias** ([`Result`])
//! - **Message envelopes** ([`InboundMessage`], [`OutboundMessage`])
//!
//! # Error Handling
//!
//! Fallible startup operations return [`Result<T, AnonymizerError>`]; the
//! stage-specific errors convert into it with `?`:
//!
//! ```rust
//! use kafka_anonymizer::anonymization::codec;
//! use kafka_anonymizer::domain::Result;
//!
//! fn example(bytes: &[u8]) -> Result<()> {
//!     let record = codec::decode(bytes)?;
//!     let _ = codec::encode(&record)?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod message;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AnonymizerError, DecodeError, EncodeError, FieldError, TransportError};
pub use message::{InboundMessage, OutboundMessage, SendIdGenerator};
pub use result::Result;
