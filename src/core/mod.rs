//! Core processing for the anonymizer.
//!
//! # Modules
//!
//! - [`pipeline`] - The anonymization loop and its per-message state machine
//! - [`generator`] - Synthetic writer and log-only reader for broker checks
//!
//! # Pipeline Workflow
//!
//! For each message delivered by the source:
//!
//! 1. **Receive**: Wait at most the poll timeout for the next message
//! 2. **Decode**: Parse the payload into an ordered JSON record
//! 3. **Redact**: Apply the rules registered for the message's schema
//! 4. **Encode**: Serialize the record back to bytes
//! 5. **Publish**: Write to the output topic, when one is configured
//!
//! A failure at any step drops or forwards that one message and the loop
//! moves on to the next.
//!
//! # Example
//!
//! ```rust,no_run
//! use kafka_anonymizer::adapters::factory::{create_sink, create_source};
//! use kafka_anonymizer::anonymization::AnonymizationEngine;
//! use kafka_anonymizer::config::load_config;
//! use kafka_anonymizer::core::pipeline::AnonymizePipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//!
//! let engine = AnonymizationEngine::from_config(&config.anonymization);
//! let source = create_source(&config.kafka)?;
//! let sink = create_sink(&config.kafka)?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let pipeline = AnonymizePipeline::new(&config, engine, source, sink);
//! let summary = pipeline.run(shutdown_rx).await;
//!
//! println!("Published: {}", summary.published);
//! # Ok(())
//! # }
//! ```

pub mod generator;
pub mod pipeline;
