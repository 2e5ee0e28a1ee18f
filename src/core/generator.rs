//! Test harness for a live broker
//!
//! [`MessageGenerator`] writes numbered synthetic messages to a topic at a
//! fixed interval, and [`log_consumer`] reads a topic and only logs what
//! arrives. Neither touches the anonymization engine.

use crate::adapters::transport::{MessageSink, MessageSource};
use crate::domain::errors::TransportError;
use crate::domain::message::OutboundMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Counters for a harness run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessSummary {
    /// Messages written or read
    pub messages: u64,
    /// Failed writes or reads
    pub failures: u64,
}

/// Synthetic message writer
pub struct MessageGenerator {
    sink: Arc<dyn MessageSink>,
    interval: Duration,
}

impl MessageGenerator {
    /// Create a generator writing to `sink` every `interval`
    pub fn new(sink: Arc<dyn MessageSink>, interval: Duration) -> Self {
        Self { sink, interval }
    }

    /// Payload of the `index`-th message
    pub fn payload(index: i64) -> Vec<u8> {
        format!("this is message{index}").into_bytes()
    }

    /// Write messages keyed by their index until `count` is reached or
    /// shutdown is signalled
    pub async fn run(self, count: Option<u64>, mut shutdown: watch::Receiver<bool>) -> HarnessSummary {
        let mut summary = HarnessSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        let mut index: i64 = 0;

        tracing::info!(
            topic = %self.sink.topic(),
            interval_ms = self.interval.as_millis() as u64,
            count = ?count,
            "Starting message generator"
        );

        loop {
            if count.is_some_and(|limit| summary.messages + summary.failures >= limit) {
                break;
            }
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let message = OutboundMessage::new(index, Self::payload(index));
            match self.sink.send(message).await {
                Ok(()) => {
                    summary.messages += 1;
                    tracing::info!(topic = %self.sink.topic(), key = index, "Generated message");
                }
                Err(e) => {
                    summary.failures += 1;
                    tracing::error!(topic = %self.sink.topic(), key = index, error = %e, "Failed to write generated message");
                }
            }
            index += 1;
        }

        if let Err(e) = self.sink.flush().await {
            tracing::error!(error = %e, "Failed to flush generated messages");
        }

        tracing::info!(
            written = summary.messages,
            failures = summary.failures,
            "Message generator stopped"
        );
        summary
    }
}

/// Read from `source` and log each message until shutdown or the source closes
pub async fn log_consumer(
    mut source: Box<dyn MessageSource>,
    mut shutdown: watch::Receiver<bool>,
) -> HarnessSummary {
    let mut summary = HarnessSummary::default();

    tracing::info!(topic = %source.topic(), "Starting log-only consumer");

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let received = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            result = source.receive() => result,
        };

        match received {
            Ok(Some(message)) => {
                summary.messages += 1;
                tracing::info!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    key = ?message.key.as_deref().map(String::from_utf8_lossy),
                    payload = %message.payload_str(),
                    "Received message"
                );
            }
            Ok(None) => {}
            Err(TransportError::Closed(reason)) => {
                tracing::warn!(reason = %reason, "Source closed");
                break;
            }
            Err(e) => {
                summary.failures += 1;
                tracing::error!(error = %e, "Could not read message");
            }
        }
    }

    tracing::info!(
        received = summary.messages,
        failures = summary.failures,
        "Log-only consumer stopped"
    );
    summary
}
