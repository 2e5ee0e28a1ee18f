//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file and listing the built-in schema policies.

use crate::anonymization::{HashAlgorithm, SchemaPolicy};
use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let anonymization = &config.anonymization;
        if anonymization.hash_algorithm.parse::<HashAlgorithm>().is_err() {
            println!(
                "⚠️  Unknown hash_algorithm '{}', falling back to {}",
                anonymization.hash_algorithm,
                anonymization.algorithm()
            );
        }

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Verbose: {}", config.application.verbose);
        println!("  Brokers: {}", config.kafka.bootstrap_servers());
        println!("  Group: {}", config.kafka.group);
        println!("  Receive Topic: {}", config.kafka.receive_topic);
        println!(
            "  Send Topic: {}",
            config.kafka.send_topic().unwrap_or("<none, log-only mode>")
        );
        println!("  Security Protocol: {}", config.kafka.security.protocol);
        println!("  Hash Algorithm: {}", anonymization.algorithm());
        println!("  Unknown Topics: {}", anonymization.unknown_topic);
        if let Some(schema) = &anonymization.schema_override {
            println!("  Schema Override: {schema}");
        }
        println!("  Generator: {}", if config.application.produce { "enabled" } else { "disabled" });

        let policy = SchemaPolicy::from_config(anonymization);
        let schema = policy.schema_key(&config.kafka.receive_topic);
        println!();
        println!("Schema Policies:");
        for line in policy_table(&policy, schema) {
            println!("  {line}");
        }
        if !policy.is_known(&config.kafka.receive_topic) {
            println!(
                "⚠️  No policy for '{schema}'; messages will be {}",
                match anonymization.unknown_topic {
                    crate::anonymization::UnknownTopicPolicy::PassThrough => "passed through unmodified",
                    crate::anonymization::UnknownTopicPolicy::Reject => "dropped",
                }
            );
        }

        let placeholders = policy.placeholder_rules();
        if !placeholders.is_empty() {
            println!();
            println!("Placeholder rules (fields left unchanged):");
            for (topic, rule) in placeholders {
                println!("  {topic}: {}", rule.path.qualified());
            }
        }
        println!();

        Ok(EXIT_OK)
    }
}

/// One line per registered schema, with `active` marked by `*`
fn policy_table(policy: &SchemaPolicy, active: &str) -> Vec<String> {
    policy
        .known_topics()
        .into_iter()
        .map(|topic| {
            let marker = if topic == active { "*" } else { " " };
            let rules: Vec<String> = policy
                .rules_for_schema(topic)
                .iter()
                .map(|r| r.to_string())
                .collect();
            format!("{marker} {topic}: {}", rules.join(", "))
        })
        .collect()
}
