//! In-process channel transport
//!
//! A [`MemorySource`] fed through a [`MemoryFeeder`], and a [`MemorySink`]
//! that records what it publishes. Used to drive the pipeline without a
//! broker.
//!
//! # Examples
//!
//! ```
//! use kafka_anonymizer::adapters::memory::{MemorySink, MemorySource};
//! use kafka_anonymizer::adapters::{MessageSink, MessageSource};
//! use kafka_anonymizer::domain::OutboundMessage;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (mut source, feeder) = MemorySource::new("raw", Duration::from_millis(10));
//! feeder.push(br#"{"data": {}}"#.to_vec()).await.unwrap();
//!
//! let message = source.receive().await.unwrap().unwrap();
//! assert_eq!(message.topic, "raw");
//!
//! let sink = MemorySink::new("anon");
//! sink.send(OutboundMessage::new(1, message.payload)).await.unwrap();
//! assert_eq!(sink.published().await.len(), 1);
//! # }
//! ```

use crate::adapters::transport::{MessageSink, MessageSource};
use crate::domain::errors::TransportError;
use crate::domain::message::{InboundMessage, OutboundMessage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

const CHANNEL_CAPACITY: usize = 1024;

type Delivery = Result<InboundMessage, TransportError>;

/// Source reading from an in-process channel
#[derive(Debug)]
pub struct MemorySource {
    topic: String,
    receiver: mpsc::Receiver<Delivery>,
    max_wait: Duration,
}

/// Writing half of a [`MemorySource`]
#[derive(Debug, Clone)]
pub struct MemoryFeeder {
    topic: String,
    sender: mpsc::Sender<Delivery>,
}

impl MemorySource {
    /// Create a source for `topic` and the feeder that supplies it
    ///
    /// `receive` returns `Ok(None)` after waiting `max_wait` on an empty
    /// channel, and [`TransportError::Closed`] once every feeder is dropped
    /// and the channel is drained.
    pub fn new(topic: impl Into<String>, max_wait: Duration) -> (Self, MemoryFeeder) {
        let topic = topic.into();
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (
            Self {
                topic: topic.clone(),
                receiver,
                max_wait,
            },
            MemoryFeeder { topic, sender },
        )
    }
}

impl MemoryFeeder {
    /// Queue a payload on the source's topic
    pub async fn push(&self, payload: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        self.push_message(InboundMessage::new(self.topic.clone(), payload))
            .await
    }

    /// Queue a fully specified message, possibly from another topic
    pub async fn push_message(&self, message: InboundMessage) -> Result<(), TransportError> {
        self.deliver(Ok(message)).await
    }

    /// Queue a read failure
    pub async fn push_error(&self, error: TransportError) -> Result<(), TransportError> {
        self.deliver(Err(error)).await
    }

    async fn deliver(&self, delivery: Delivery) -> Result<(), TransportError> {
        self.sender
            .send(delivery)
            .await
            .map_err(|_| TransportError::Closed("memory source dropped".to_string()))
    }
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        match tokio::time::timeout(self.max_wait, self.receiver.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(None) => Err(TransportError::Closed(format!(
                "memory source '{}' has no feeders",
                self.topic
            ))),
            Ok(Some(delivery)) => delivery.map(Some),
        }
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

/// Sink that keeps every published message in memory
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemorySink {
    topic: String,
    published: Arc<Mutex<Vec<OutboundMessage>>>,
    failures_pending: Arc<AtomicUsize>,
}

impl MemorySink {
    /// Create an empty sink for `topic`
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            published: Arc::new(Mutex::new(Vec::new())),
            failures_pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next `count` sends fail with [`TransportError::Send`]
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Messages published so far, in publish order
    pub async fn published(&self) -> Vec<OutboundMessage> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let should_fail = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(TransportError::Send(format!(
                "injected failure for key {}",
                message.key()
            )));
        }

        self.published.lock().await.push(message);
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_then_closed() {
        let (mut source, feeder) = MemorySource::new("raw", Duration::from_millis(5));
        assert!(source.receive().await.unwrap().is_none());

        feeder.push(b"x".to_vec()).await.unwrap();
        drop(feeder);

        let message = source.receive().await.unwrap().unwrap();
        assert_eq!(message.payload, b"x");
        assert!(matches!(
            source.receive().await,
            Err(TransportError::Closed(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_receive_error() {
        let (mut source, feeder) = MemorySource::new("raw", Duration::from_millis(5));
        feeder
            .push_error(TransportError::Receive("boom".to_string()))
            .await
            .unwrap();
        assert!(matches!(
            source.receive().await,
            Err(TransportError::Receive(_))
        ));
    }

    #[tokio::test]
    async fn test_sink_failures() {
        let sink = MemorySink::new("anon");
        sink.fail_next(1);

        assert!(sink.send(OutboundMessage::new(1, vec![])).await.is_err());
        assert!(sink.send(OutboundMessage::new(2, vec![])).await.is_ok());

        let published = sink.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].send_id, 2);
    }
}
