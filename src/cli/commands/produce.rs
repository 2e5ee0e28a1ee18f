//! Produce command implementation
//!
//! This module implements the `produce` command, which writes numbered
//! synthetic messages to the send topic.

use crate::adapters::factory::create_sink_for;
use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK, EXIT_TRANSPORT_ERROR};
use crate::config::load_config;
use crate::core::generator::MessageGenerator;
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the produce command
#[derive(Args, Debug, Default)]
pub struct ProduceArgs {
    /// Stop after this many messages (default: until interrupted)
    #[arg(long)]
    pub count: Option<u64>,

    /// Override the topic to write to
    #[arg(long)]
    pub topic: Option<String>,

    /// Override the delay between messages, in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,
}

impl ProduceArgs {
    /// Execute the produce command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let Some(topic) = self
            .topic
            .as_deref()
            .or_else(|| config.kafka.send_topic())
            .map(str::to_string)
        else {
            eprintln!("No topic to write to: set kafka.send_topic or pass --topic");
            return Ok(EXIT_CONFIG_ERROR);
        };

        let interval = self
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.generator.interval());
        if interval.is_zero() {
            eprintln!("--interval-ms must be greater than 0");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let sink = match create_sink_for(&config.kafka, &topic) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Kafka producer");
                eprintln!("Failed to connect to Kafka: {e}");
                return Ok(EXIT_TRANSPORT_ERROR);
            }
        };

        let summary = MessageGenerator::new(sink, interval)
            .run(self.count, shutdown_signal)
            .await;
        println!("Wrote {} messages to {topic} ({} failed)", summary.messages, summary.failures);

        Ok(EXIT_OK)
    }
}
