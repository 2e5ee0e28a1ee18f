//! Kafka message reader

use crate::adapters::kafka::client::base_client_config;
use crate::adapters::transport::MessageSource;
use crate::config::schema::KafkaConfig;
use crate::domain::errors::TransportError;
use crate::domain::message::InboundMessage;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::time::Duration;

/// Reader for one topic within a consumer group
pub struct KafkaSource {
    consumer: StreamConsumer,
    topic: String,
    max_wait: Duration,
}

impl KafkaSource {
    /// Create a reader subscribed to the configured receive topic
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the client cannot be created
    /// or the subscription fails.
    pub fn new(config: &KafkaConfig) -> Result<Self, TransportError> {
        let consumer: StreamConsumer = consumer_client_config(config).create()?;
        consumer.subscribe(&[config.receive_topic.as_str()])?;

        tracing::info!(
            brokers = %config.bootstrap_servers(),
            topic = %config.receive_topic,
            group = %config.group,
            "Subscribed to receive topic"
        );

        Ok(Self {
            consumer,
            topic: config.receive_topic.clone(),
            max_wait: config.consumer.max_wait(),
        })
    }
}

/// Client properties for the reader
fn consumer_client_config(config: &KafkaConfig) -> ClientConfig {
    let consumer = &config.consumer;
    let mut client = base_client_config(config);
    client
        .set("group.id", &config.group)
        .set("auto.offset.reset", consumer.start_offset.as_str())
        .set("enable.auto.commit", consumer.enable_auto_commit.to_string())
        .set("fetch.min.bytes", consumer.min_bytes.to_string())
        .set("fetch.max.bytes", consumer.max_bytes.to_string())
        .set(
            "message.max.bytes",
            consumer.max_bytes.clamp(1000, 1_000_000).to_string(),
        )
        .set("fetch.wait.max.ms", consumer.max_wait_ms.to_string());
    client
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let message = match tokio::time::timeout(self.max_wait, self.consumer.recv()).await {
            Err(_elapsed) => return Ok(None),
            Ok(Err(e)) => return Err(TransportError::Receive(e.to_string())),
            Ok(Ok(message)) => message,
        };

        let mut inbound = InboundMessage::new(message.topic(), message.payload().unwrap_or_default())
            .with_position(message.partition(), message.offset());
        if let Some(key) = message.key() {
            inbound = inbound.with_key(key);
        }

        Ok(Some(inbound))
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}
