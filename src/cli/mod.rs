//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the anonymizer using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code for a successful run
pub const EXIT_OK: i32 = 0;

/// Exit code for a configuration that cannot be loaded or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for a broker client that cannot be created
pub const EXIT_TRANSPORT_ERROR: i32 = 4;

/// Exit code for any other failure
pub const EXIT_FATAL: i32 = 5;

/// kafka-anonymizer - streaming JSON field anonymization for Kafka topics
#[derive(Parser, Debug)]
#[command(name = "kafka-anonymizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML, or legacy JSON when it ends in .json)
    #[arg(short, long, default_value = "anonymizer.toml", env = "ANONYMIZER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ANONYMIZER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the command reads the configuration file
    pub fn needs_config(&self) -> bool {
        !matches!(self.command, Commands::Init(_))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize the receive topic into the send topic
    Run(commands::run::RunArgs),

    /// Log messages from the receive topic without anonymizing them
    Consume(commands::consume::ConsumeArgs),

    /// Write numbered synthetic messages to the send topic
    Produce(commands::produce::ProduceArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["kafka-anonymizer", "run"]);
        assert_eq!(cli.config, "anonymizer.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
        assert!(cli.needs_config());
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::parse_from([
            "kafka-anonymizer",
            "run",
            "--send-topic",
            "anon",
            "--verbose",
            "2",
            "--hash",
            "sha256",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.send_topic.as_deref(), Some("anon"));
        assert_eq!(args.verbose, Some(2));
        assert_eq!(args.hash.as_deref(), Some("sha256"));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["kafka-anonymizer", "--config", "custom.json", "consume"]);
        assert_eq!(cli.config, "custom.json");
        assert!(matches!(cli.command, Commands::Consume(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["kafka-anonymizer", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_produce() {
        let cli = Cli::parse_from(["kafka-anonymizer", "produce", "--count", "5"]);
        let Commands::Produce(args) = cli.command else {
            panic!("expected produce command");
        };
        assert_eq!(args.count, Some(5));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["kafka-anonymizer", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["kafka-anonymizer", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
        assert!(!cli.needs_config());
    }
}
