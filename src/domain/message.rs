//! Broker message envelopes
//!
//! Transport-neutral representations of what the pipeline receives and what
//! it publishes. Kafka-specific types never cross this boundary.

use chrono::Utc;
use std::borrow::Cow;

/// A message delivered by a [`MessageSource`](crate::adapters::MessageSource)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message was read from
    pub topic: String,

    /// Partition within the topic
    pub partition: i32,

    /// Offset within the partition
    pub offset: i64,

    /// Optional message key
    pub key: Option<Vec<u8>>,

    /// Raw payload bytes
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Create a message for `topic` with the given payload
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            partition: 0,
            offset: 0,
            key: None,
            payload: payload.into(),
        }
    }

    /// Sets the partition and offset
    pub fn with_position(mut self, partition: i32, offset: i64) -> Self {
        self.partition = partition;
        self.offset = offset;
        self
    }

    /// Sets the message key
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// A message handed to a [`MessageSink`](crate::adapters::MessageSink)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Send identifier, also used as the message key
    pub send_id: i64,

    /// Encoded payload
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Create an outbound message
    pub fn new(send_id: i64, payload: Vec<u8>) -> Self {
        Self { send_id, payload }
    }

    /// Key bytes derived from the send identifier
    pub fn key(&self) -> String {
        self.send_id.to_string()
    }
}

/// Generates strictly increasing, timestamp-derived send identifiers
///
/// Identifiers are nanoseconds since the Unix epoch. If the wall clock does
/// not advance (or goes backwards) between calls, the previous identifier
/// plus one is returned instead.
#[derive(Debug, Default)]
pub struct SendIdGenerator {
    last: i64,
}

impl SendIdGenerator {
    /// Create a new generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier
    pub fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MIN);
        let id = if now > self.last { now } else { self.last + 1 };
        self.last = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_builder() {
        let msg = InboundMessage::new("cmssw_pop_raw_metric", b"{}".to_vec())
            .with_position(3, 42)
            .with_key("k1");

        assert_eq!(msg.topic, "cmssw_pop_raw_metric");
        assert_eq!(msg.partition, 3);
        assert_eq!(msg.offset, 42);
        assert_eq!(msg.key.as_deref(), Some(&b"k1"[..]));
        assert_eq!(msg.payload_str(), "{}");
    }

    #[test]
    fn test_payload_str_lossy() {
        let msg = InboundMessage::new("t", vec![0xff, b'a']);
        assert!(msg.payload_str().ends_with('a'));
    }

    #[test]
    fn test_send_ids_strictly_increase() {
        let mut ids = SendIdGenerator::new();
        let mut previous = ids.next_id();
        for _ in 0..1000 {
            let next = ids.next_id();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_outbound_key() {
        let msg = OutboundMessage::new(1_700_000_000_000_000_000, b"{}".to_vec());
        assert_eq!(msg.key(), "1700000000000000000");
    }
}
