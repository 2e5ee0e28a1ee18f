//! Run command implementation
//!
//! This module implements the `run` command, which anonymizes the receive
//! topic into the send topic until a shutdown signal arrives.

use crate::adapters::factory::{create_sink, create_sink_for, create_source};
use crate::anonymization::AnonymizationEngine;
use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK, EXIT_TRANSPORT_ERROR};
use crate::config::{load_config, AnonymizerConfig};
use crate::core::generator::MessageGenerator;
use crate::core::pipeline::AnonymizePipeline;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the topic to read from
    #[arg(long)]
    pub receive_topic: Option<String>,

    /// Override the topic to publish to (empty for log-only mode)
    #[arg(long)]
    pub send_topic: Option<String>,

    /// Override payload logging (1 = received, 2 = received and redacted)
    #[arg(long, value_name = "N")]
    pub verbose: Option<u8>,

    /// Override the digest algorithm (sha1, sha256, sha512)
    #[arg(long, value_name = "ALG")]
    pub hash: Option<String>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AnonymizerConfig) {
        if let Some(topic) = &self.receive_topic {
            tracing::info!(topic = %topic, "Overriding receive topic from CLI");
            config.kafka.receive_topic = topic.clone();
        }
        if let Some(topic) = &self.send_topic {
            tracing::info!(topic = %topic, "Overriding send topic from CLI");
            config.kafka.send_topic = Some(topic.clone()).filter(|t| !t.is_empty());
        }
        if let Some(verbose) = self.verbose {
            config.application.verbose = verbose;
        }
        if let Some(hash) = &self.hash {
            tracing::info!(algorithm = %hash, "Overriding hash algorithm from CLI");
            config.anonymization.hash_algorithm = hash.clone();
        }
    }

    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let engine = AnonymizationEngine::from_config(&config.anonymization);
        for (topic, rule) in engine.policy().placeholder_rules() {
            tracing::debug!(topic = %topic, rule = %rule, "Placeholder rule leaves field unchanged");
        }

        let (source, sink) = match (create_source(&config.kafka), create_sink(&config.kafka)) {
            (Ok(source), Ok(sink)) => (source, sink),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to create Kafka clients");
                eprintln!("Failed to connect to Kafka: {e}");
                return Ok(EXIT_TRANSPORT_ERROR);
            }
        };

        let generator = if config.application.produce {
            match config.kafka.send_topic() {
                Some(topic) => {
                    let generator_sink = match create_sink_for(&config.kafka, topic) {
                        Ok(sink) => sink,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to create generator producer");
                            eprintln!("Failed to connect to Kafka: {e}");
                            return Ok(EXIT_TRANSPORT_ERROR);
                        }
                    };
                    let generator =
                        MessageGenerator::new(generator_sink, config.generator.interval());
                    let signal = shutdown_signal.clone();
                    Some(tokio::spawn(async move { generator.run(None, signal).await }))
                }
                None => {
                    tracing::warn!("produce is enabled but no send topic is configured, skipping generator");
                    None
                }
            }
        } else {
            None
        };

        let pipeline = AnonymizePipeline::new(&config, engine, source, sink);
        let summary = pipeline.run(shutdown_signal).await;

        if let Some(handle) = generator {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Message generator task failed");
            }
        }

        println!();
        println!("📊 Pipeline Summary:");
        println!("  Received: {}", summary.received);
        println!("  Published: {}", summary.published);
        println!("  Passed through: {}", summary.passed_through);
        println!("  Dropped: {}", summary.dropped());
        println!("  Publish failures: {}", summary.publish_failures);
        println!("  Receive errors: {}", summary.receive_errors);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

        Ok(EXIT_OK)
    }
}
