//! Kafka broker adapter
//!
//! [`KafkaSource`] reads one topic as a member of a consumer group and
//! [`KafkaSink`] writes one topic, both on `rdkafka`.

pub mod client;
pub mod consumer;
pub mod producer;

pub use consumer::KafkaSource;
pub use producer::KafkaSink;
