//! Configuration management for the anonymizer.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The anonymizer reads a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ANONYMIZER_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - The flat JSON layout of earlier deployments (any `.json` path)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kafka_anonymizer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//!
//! println!("Reading from: {}", config.kafka.receive_topic);
//! match config.kafka.send_topic() {
//!     Some(topic) => println!("Publishing to: {topic}"),
//!     None => println!("Log-only mode"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, payload verbosity, generator toggle
//! - [`KafkaConfig`] - Brokers, group and topics, with [`ConsumerConfig`],
//!   [`ProducerConfig`] and [`SecurityConfig`] subsections
//! - [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig) - Digest
//!   algorithm and unknown-topic handling
//! - [`GeneratorConfig`] - Synthetic message interval
//! - [`LoggingConfig`] - Rotating JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! verbose = 0
//!
//! [kafka]
//! brokers = ["broker1:9092", "broker2:9092"]
//! group = "anonymizer"
//! receive_topic = "cmssw_pop_raw_metric"
//! send_topic = "cmssw_pop_anon_metric"
//!
//! [kafka.security]
//! protocol = "sasl_ssl"
//! sasl_mechanism = "SCRAM-SHA-512"
//! sasl_username = "anonymizer"
//! sasl_password = "${KAFKA_PASSWORD}"
//!
//! [anonymization]
//! hash_algorithm = "sha1"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AnonymizerConfig, ApplicationConfig, ConsumerConfig, GeneratorConfig, KafkaConfig,
    LegacyConfig, LoggingConfig, ProducerConfig, SecurityConfig, StartOffset,
};
pub use secret::{secret_string, SecretString, SecretValue};
