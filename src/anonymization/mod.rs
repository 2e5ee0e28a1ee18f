//! Anonymization module
//!
//! Field-level redaction of JSON records according to per-schema policies.
//!
//! # Architecture
//!
//! - **Codec** ([`codec`], [`record`]): bytes ⇄ generic ordered [`Record`]
//! - **Policy** ([`policy`]): topic → ordered [`RedactionRule`]s
//! - **Hasher** ([`hasher`]): deterministic digest of a string value
//! - **Engine** ([`engine`]): applies rules to a record, producing a
//!   [`RedactionReport`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use kafka_anonymizer::anonymization::{AnonymizationEngine, config::AnonymizationConfig};
//!
//! let engine = AnonymizationEngine::from_config(&AnonymizationConfig::default());
//! let mut record = codec::decode(payload)?;
//! let report = engine.apply(&mut record, engine.policy().rules_for(topic));
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod hasher;
pub mod policy;
pub mod record;
pub mod report;

// Re-export main types
pub use config::AnonymizationConfig;
pub use engine::AnonymizationEngine;
pub use hasher::{HashAlgorithm, HashRedactor};
pub use policy::{PolicyDecision, RedactionRule, SchemaPolicy, Transform, UnknownTopicPolicy};
pub use record::{FieldPath, Record};
pub use report::RedactionReport;
