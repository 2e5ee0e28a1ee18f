//! Transport factory
//!
//! This module provides factory functions to create broker clients based on configuration.

use crate::adapters::kafka::{KafkaSink, KafkaSource};
use crate::adapters::transport::{MessageSink, MessageSource};
use crate::config::schema::KafkaConfig;
use crate::domain::errors::TransportError;
use std::sync::Arc;

/// Create the reader for the configured receive topic
///
/// # Errors
///
/// Returns an error if the client cannot be created or subscribed
pub fn create_source(config: &KafkaConfig) -> Result<Box<dyn MessageSource>, TransportError> {
    tracing::info!("Creating Kafka consumer");
    let source = KafkaSource::new(config)?;
    Ok(Box::new(source))
}

/// Create the writer for the configured send topic
///
/// Returns `Ok(None)` when no send topic is configured (log-only mode).
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub fn create_sink(config: &KafkaConfig) -> Result<Option<Arc<dyn MessageSink>>, TransportError> {
    match config.send_topic() {
        Some(topic) => {
            tracing::info!(topic = %topic, "Creating Kafka producer");
            let sink = KafkaSink::new(config, topic)?;
            Ok(Some(Arc::new(sink) as Arc<dyn MessageSink>))
        }
        None => {
            tracing::info!("No send topic configured, running in log-only mode");
            Ok(None)
        }
    }
}

/// Create a writer for an explicit topic
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub fn create_sink_for(
    config: &KafkaConfig,
    topic: &str,
) -> Result<Arc<dyn MessageSink>, TransportError> {
    tracing::info!(topic = %topic, "Creating Kafka producer");
    Ok(Arc::new(KafkaSink::new(config, topic)?))
}
