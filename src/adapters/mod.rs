//! External system integrations.
//!
//! This module provides the broker transport used by the pipeline:
//!
//! - [`transport`] - Reader and writer traits ([`MessageSource`], [`MessageSink`])
//! - [`kafka`] - Kafka implementation on `rdkafka`
//! - [`memory`] - In-process channel implementation
//! - [`factory`] - Builds Kafka clients from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-process implementations. The pipeline only sees the
//! traits, so the same loop runs against a broker or a channel.
//!
//! ```rust,no_run
//! use kafka_anonymizer::adapters::factory::{create_sink, create_source};
//! use kafka_anonymizer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//! let source = create_source(&config.kafka)?;
//! let sink = create_sink(&config.kafka)?;
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod kafka;
pub mod memory;
pub mod transport;

pub use transport::{MessageSink, MessageSource};
