//! Transport abstraction traits
//!
//! This module defines the traits that broker adapters must implement
//! to feed and drain the anonymization pipeline.

use crate::domain::errors::TransportError;
use crate::domain::message::{InboundMessage, OutboundMessage};
use async_trait::async_trait;

/// Reader bound to one input topic and consumer group
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message
    ///
    /// Waits at most the configured poll timeout.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(message))` when a message arrived and `Ok(None)` when
    /// the wait elapsed without one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Receive`] for a failed read and
    /// [`TransportError::Closed`] once the source can never yield again.
    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError>;

    /// Topic this source reads from
    fn topic(&self) -> &str;
}

/// Writer bound to one output topic
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Publish one message and wait for the broker's acknowledgment
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if the write was not acknowledged.
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError>;

    /// Deliver anything still buffered; called once when the pipeline stops
    async fn flush(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Topic this sink writes to
    fn topic(&self) -> &str;
}
