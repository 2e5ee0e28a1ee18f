//! Consume command implementation
//!
//! This module implements the `consume` command, a log-only reader of the
//! receive topic used to check broker connectivity.

use crate::adapters::factory::create_source;
use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK, EXIT_TRANSPORT_ERROR};
use crate::config::load_config;
use crate::core::generator::log_consumer;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the consume command
#[derive(Args, Debug, Default)]
pub struct ConsumeArgs {
    /// Override the topic to read from
    #[arg(long)]
    pub topic: Option<String>,
}

impl ConsumeArgs {
    /// Execute the consume command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if let Some(topic) = &self.topic {
            config.kafka.receive_topic = topic.clone();
        }

        let source = match create_source(&config.kafka) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Kafka consumer");
                eprintln!("Failed to connect to Kafka: {e}");
                return Ok(EXIT_TRANSPORT_ERROR);
            }
        };

        let summary = log_consumer(source, shutdown_signal).await;
        println!("Received {} messages ({} read errors)", summary.messages, summary.failures);

        Ok(EXIT_OK)
    }
}
