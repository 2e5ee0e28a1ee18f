//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "anonymizer.toml")]
    pub output: String,

    /// Include every section with its default values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing anonymizer configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your brokers and topics", self.output);
                println!("  2. Put broker credentials in a .env file if SASL is used");
                println!("  3. Validate configuration: kafka-anonymizer validate-config");
                println!("  4. Start the pipeline: kafka-anonymizer run");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    pub fn generate_minimal_config() -> String {
        r#"# kafka-anonymizer configuration

[application]
log_level = "info"
verbose = 0

[kafka]
brokers = ["localhost:9092"]
group = "anonymizer"
receive_topic = "cmssw_pop_raw_metric"
send_topic = "cmssw_pop_anon_metric"

[anonymization]
hash_algorithm = "sha1"
"#
        .to_string()
    }

    /// Generate configuration with every section
    pub fn generate_config_with_examples() -> String {
        r#"# kafka-anonymizer configuration
#
# Values of the form ${VAR} are replaced from the environment, and any key
# can be overridden with ANONYMIZER_<SECTION>_<KEY>.

[application]
# trace | debug | info | warn | error (RUST_LOG takes precedence)
log_level = "info"
# 1 logs every received payload, 2 also logs the redacted payload
verbose = 0
# Also write numbered test messages to send_topic
produce = false

[kafka]
brokers = ["localhost:9092"]
group = "anonymizer"
receive_topic = "cmssw_pop_raw_metric"
# Leave out or set to "" to only log redacted records
send_topic = "cmssw_pop_anon_metric"

[kafka.consumer]
min_bytes = 5
max_bytes = 1000000
max_wait_ms = 3000
start_offset = "earliest"  # earliest | latest
enable_auto_commit = true

[kafka.producer]
batch_size = 10
batch_timeout_ms = 2000
required_acks = 1          # -1 (all) | 0 (none) | 1 (leader)
message_timeout_ms = 30000

[kafka.security]
protocol = "plaintext"     # plaintext | ssl | sasl_plaintext | sasl_ssl
# sasl_mechanism = "SCRAM-SHA-512"
# sasl_username = "anonymizer"
# sasl_password = "${KAFKA_SASL_PASSWORD}"

[anonymization]
hash_algorithm = "sha1"    # sha1 | sha256 | sha512
unknown_topic = "pass_through"  # pass_through | reject
# Look up rules under this schema instead of the message topic
# schema_override = "cmssw_pop_raw_metric"

[generator]
interval_ms = 1000

[logging]
local_enabled = false
local_path = "/var/log/kafka-anonymizer"
local_rotation = "daily"   # daily | hourly | never
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_toml;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_parse_and_validate() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_toml(&content).unwrap();
            assert!(config.validate().is_ok());
            assert_eq!(config.kafka.receive_topic, "cmssw_pop_raw_metric");
        }
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("anonymizer.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output).unwrap().contains("[kafka]"));
    }
}
