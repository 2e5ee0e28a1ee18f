//! Kafka message writer

use crate::adapters::kafka::client::base_client_config;
use crate::adapters::transport::MessageSink;
use crate::config::schema::KafkaConfig;
use crate::domain::errors::TransportError;
use crate::domain::message::OutboundMessage;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;

/// Writer for one topic
#[derive(Clone)]
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
    message_timeout: Duration,
}

impl KafkaSink {
    /// Create a writer for `topic`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the client cannot be created.
    pub fn new(config: &KafkaConfig, topic: impl Into<String>) -> Result<Self, TransportError> {
        let topic = topic.into();
        let producer: FutureProducer = producer_client_config(config).create()?;

        tracing::info!(
            brokers = %config.bootstrap_servers(),
            topic = %topic,
            "Created producer"
        );

        Ok(Self {
            producer,
            topic,
            message_timeout: config.producer.message_timeout(),
        })
    }
}

/// Client properties for the writer
fn producer_client_config(config: &KafkaConfig) -> ClientConfig {
    let producer = &config.producer;
    let mut client = base_client_config(config);
    client
        .set("batch.num.messages", producer.batch_size.to_string())
        .set("linger.ms", producer.batch_timeout_ms.to_string())
        .set("acks", producer.required_acks.to_string())
        .set("message.timeout.ms", producer.message_timeout_ms.to_string());
    client
}

#[async_trait]
impl MessageSink for KafkaSink {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let key = message.key();
        let record = FutureRecord::to(&self.topic)
            .key(key.as_str())
            .payload(message.payload.as_slice());

        self.producer
            .send(record, Timeout::After(self.message_timeout))
            .await
            .map(|_| ())
            .map_err(|(e, _)| TransportError::Send(e.to_string()))
    }

    async fn flush(&self) -> Result<(), TransportError> {
        let producer = self.producer.clone();
        let timeout = self.message_timeout;
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?
            .map_err(|e| TransportError::Send(format!("flush failed: {e}")))
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}
