// kafka-anonymizer - Streaming JSON field anonymization for Kafka
// Copyright (c) 2025 Kafka Anonymizer Contributors
// Licensed under the MIT License

//! # kafka-anonymizer - Streaming JSON Field Anonymization
//!
//! kafka-anonymizer reads JSON monitoring records from one Kafka topic,
//! replaces personally identifying fields with one-way digests, and publishes
//! the redacted records to another topic.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Decoding** records into ordered JSON without a fixed schema
//! - **Redacting** fields selected by per-topic policies (hash, drop, placeholder)
//! - **Republishing** redacted records with monotonic send identifiers
//! - **Tolerating** per-message failures without stopping the stream
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The anonymization pipeline and broker test harness
//! - [`anonymization`] - Codec, policies, digests and the redaction engine
//! - [`adapters`] - Broker transport (Kafka, in-process channels)
//! - [`domain`] - Messages, errors and result types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kafka_anonymizer::adapters::factory::{create_sink, create_source};
//! use kafka_anonymizer::anonymization::AnonymizationEngine;
//! use kafka_anonymizer::config::load_config;
//! use kafka_anonymizer::core::pipeline::AnonymizePipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("anonymizer.toml")?;
//!
//!     let engine = AnonymizationEngine::from_config(&config.anonymization);
//!     let source = create_source(&config.kafka)?;
//!     let sink = create_sink(&config.kafka)?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let summary = AnonymizePipeline::new(&config, engine, source, sink)
//!         .run(shutdown_rx)
//!         .await;
//!
//!     println!("Published {} records", summary.published);
//!     Ok(())
//! }
//! ```
//!
//! ## Redacting a Single Record
//!
//! ```rust
//! use kafka_anonymizer::anonymization::{codec, AnonymizationEngine, SchemaPolicy};
//! use kafka_anonymizer::anonymization::HashAlgorithm;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha1);
//!
//! let mut record = codec::decode(br#"{"metadata": {}, "data": {"user_dn": "CN=Alice"}}"#)?;
//! let report = engine.apply(&mut record, engine.policy().rules_for("cmssw_pop_raw_metric"));
//! assert_eq!(report.hashed.len(), 1);
//!
//! let bytes = codec::encode(&record)?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], which carries an
//! [`domain::AnonymizerError`]. Per-message failures use narrower types
//! ([`domain::DecodeError`], [`domain::FieldError`], [`domain::TransportError`])
//! that the pipeline logs and counts instead of propagating.
//!
//! ## Logging
//!
//! Structured logging uses the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(topic = "cmssw_pop_raw_metric", "Starting anonymization pipeline");
//! warn!(field = "data.user_dn", "Field left unredacted");
//! ```

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
