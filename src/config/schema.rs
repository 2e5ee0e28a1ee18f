//! Configuration schema types
//!
//! This module defines the configuration structure for the anonymizer.

use crate::anonymization::config::AnonymizationConfig;
use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main anonymizer configuration
///
/// This is the root configuration structure that maps to the TOML file. It
/// is built once at startup and passed by reference to everything that
/// needs it; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Broker connection and topics
    pub kafka: KafkaConfig,

    /// Redaction settings
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Synthetic message generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnonymizerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.kafka.validate()?;
        self.anonymization
            .validate()
            .map_err(|e| format!("anonymization: {e}"))?;
        self.generator.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Payload logging: 1 logs received payloads, 2 also logs redacted ones
    #[serde(default)]
    pub verbose: u8,

    /// Run the synthetic message generator alongside the pipeline
    #[serde(default)]
    pub produce: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            verbose: 0,
            produce: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Where a new consumer group starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOffset {
    /// Oldest available message
    #[default]
    Earliest,
    /// Only messages produced after joining
    Latest,
}

impl StartOffset {
    /// Value for the `auto.offset.reset` client property
    pub fn as_str(&self) -> &'static str {
        match self {
            StartOffset::Earliest => "earliest",
            StartOffset::Latest => "latest",
        }
    }
}

/// Broker connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Bootstrap brokers as `host:port`
    pub brokers: Vec<String>,

    /// Consumer group identifier
    pub group: String,

    /// Topic to read records from
    pub receive_topic: String,

    /// Topic to publish redacted records to; unset means log-only mode
    #[serde(default)]
    pub send_topic: Option<String>,

    /// Reader settings
    #[serde(default)]
    pub consumer: ConsumerConfig,

    /// Writer settings
    #[serde(default)]
    pub producer: ProducerConfig,

    /// Connection security
    #[serde(default)]
    pub security: SecurityConfig,
}

impl KafkaConfig {
    /// Output topic, treating an empty string as unset
    pub fn send_topic(&self) -> Option<&str> {
        self.send_topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Brokers joined for the `bootstrap.servers` client property
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    fn validate(&self) -> Result<(), String> {
        if self.brokers.is_empty() {
            return Err("kafka.brokers cannot be empty".to_string());
        }
        for broker in &self.brokers {
            validate_broker_address(broker)?;
        }

        if self.group.trim().is_empty() {
            return Err("kafka.group cannot be empty".to_string());
        }

        if self.receive_topic.trim().is_empty() {
            return Err("kafka.receive_topic cannot be empty".to_string());
        }

        if self.send_topic() == Some(self.receive_topic.trim()) {
            return Err(format!(
                "kafka.send_topic must differ from kafka.receive_topic ('{}')",
                self.receive_topic
            ));
        }

        self.consumer.validate()?;
        self.producer.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

fn validate_broker_address(broker: &str) -> Result<(), String> {
    let (host, port) = broker
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid broker '{broker}'. Expected host:port"))?;
    if host.is_empty() {
        return Err(format!("Invalid broker '{broker}'. Host cannot be empty"));
    }
    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(format!("Invalid broker '{broker}'. Port must be 1-65535")),
    }
}

/// Reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Minimum bytes the broker accumulates before answering a fetch
    #[serde(default = "default_min_bytes")]
    pub min_bytes: usize,

    /// Maximum bytes returned by a fetch
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum wait per poll before an idle result, in milliseconds
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    /// Start position for a new consumer group
    #[serde(default)]
    pub start_offset: StartOffset,

    /// Let the client commit offsets periodically
    #[serde(default = "default_true")]
    pub enable_auto_commit: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            min_bytes: default_min_bytes(),
            max_bytes: default_max_bytes(),
            max_wait_ms: default_max_wait_ms(),
            start_offset: StartOffset::default(),
            enable_auto_commit: true,
        }
    }
}

impl ConsumerConfig {
    /// Maximum wait per poll
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    fn validate(&self) -> Result<(), String> {
        if self.min_bytes == 0 {
            return Err("kafka.consumer.min_bytes must be at least 1".to_string());
        }
        if self.max_bytes < self.min_bytes {
            return Err(format!(
                "kafka.consumer.max_bytes ({}) must be >= min_bytes ({})",
                self.max_bytes, self.min_bytes
            ));
        }
        if self.max_wait_ms == 0 {
            return Err("kafka.consumer.max_wait_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Writer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Messages per batch before a write is flushed
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum time a partial batch waits, in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,

    /// Acknowledgment level: -1 (all replicas), 0 (none), 1 (leader)
    #[serde(default = "default_required_acks")]
    pub required_acks: i16,

    /// Delivery timeout per message, in milliseconds
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
            required_acks: default_required_acks(),
            message_timeout_ms: default_message_timeout_ms(),
        }
    }
}

impl ProducerConfig {
    /// Delivery timeout per message
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("kafka.producer.batch_size must be at least 1".to_string());
        }
        if ![-1, 0, 1].contains(&self.required_acks) {
            return Err(format!(
                "Invalid kafka.producer.required_acks '{}'. Must be one of: -1, 0, 1",
                self.required_acks
            ));
        }
        if self.message_timeout_ms == 0 {
            return Err("kafka.producer.message_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Broker connection security
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// plaintext, ssl, sasl_plaintext or sasl_ssl
    #[serde(default = "default_security_protocol")]
    pub protocol: String,

    /// SASL mechanism (e.g. PLAIN, SCRAM-SHA-512)
    #[serde(default)]
    pub sasl_mechanism: Option<String>,

    /// SASL username
    #[serde(default)]
    pub sasl_username: Option<String>,

    /// SASL password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub sasl_password: Option<SecretString>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            protocol: default_security_protocol(),
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
        }
    }
}

impl SecurityConfig {
    /// Whether the protocol uses SASL authentication
    pub fn uses_sasl(&self) -> bool {
        self.protocol.starts_with("sasl_")
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let valid_protocols = ["plaintext", "ssl", "sasl_plaintext", "sasl_ssl"];
        if !valid_protocols.contains(&self.protocol.as_str()) {
            return Err(format!(
                "Invalid kafka.security.protocol '{}'. Must be one of: {}",
                self.protocol,
                valid_protocols.join(", ")
            ));
        }

        if self.uses_sasl() {
            if self
                .sasl_username
                .as_ref()
                .map(|s| s.is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "kafka.security.sasl_username cannot be empty when using SASL".to_string(),
                );
            }
            if self
                .sasl_password
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "kafka.security.sasl_password cannot be empty when using SASL".to_string(),
                );
            }
        }
        Ok(())
    }
}

/// Synthetic message generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Delay between generated messages, in milliseconds
    #[serde(default = "default_generator_interval_ms")]
    pub interval_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_generator_interval_ms(),
        }
    }
}

impl GeneratorConfig {
    /// Delay between generated messages
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("generator.interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write JSON logs to rotating files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_enabled {
            if self.local_path.is_empty() {
                return Err("logging.local_path cannot be empty when local logging is enabled"
                    .to_string());
            }

            let valid_rotations = ["daily", "hourly", "never"];
            if !valid_rotations.contains(&self.local_rotation.as_str()) {
                return Err(format!(
                    "Invalid logging.local_rotation '{}'. Must be one of: {}",
                    self.local_rotation,
                    valid_rotations.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// Flat JSON configuration accepted for existing deployments
///
/// ```json
/// {"receive_topic": "raw", "send_topic": "anon", "group": "g",
///  "brokers": ["host:9092"], "produce": false, "sha": "sha1"}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyConfig {
    /// Output topic, empty for log-only mode
    #[serde(default)]
    pub send_topic: String,

    /// Input topic
    #[serde(default)]
    pub receive_topic: String,

    /// Consumer group
    #[serde(default)]
    pub group: String,

    /// Bootstrap brokers
    #[serde(default)]
    pub brokers: Vec<String>,

    /// Run the synthetic generator
    #[serde(default)]
    pub produce: bool,

    /// Digest algorithm name
    #[serde(default)]
    pub sha: String,

    /// Payload logging level
    #[serde(default)]
    pub verbose: u8,
}

impl From<LegacyConfig> for AnonymizerConfig {
    fn from(legacy: LegacyConfig) -> Self {
        Self {
            application: ApplicationConfig {
                verbose: legacy.verbose,
                produce: legacy.produce,
                ..ApplicationConfig::default()
            },
            kafka: KafkaConfig {
                brokers: legacy.brokers,
                group: legacy.group,
                receive_topic: legacy.receive_topic,
                send_topic: Some(legacy.send_topic).filter(|t| !t.is_empty()),
                consumer: ConsumerConfig::default(),
                producer: ProducerConfig::default(),
                security: SecurityConfig::default(),
            },
            anonymization: AnonymizationConfig {
                hash_algorithm: legacy.sha,
                ..AnonymizationConfig::default()
            },
            generator: GeneratorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_bytes() -> usize {
    5
}

fn default_max_bytes() -> usize {
    1_000_000
}

fn default_max_wait_ms() -> u64 {
    3000
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_timeout_ms() -> u64 {
    2000
}

fn default_required_acks() -> i16 {
    1
}

fn default_message_timeout_ms() -> u64 {
    30000
}

fn default_security_protocol() -> String {
    "plaintext".to_string()
}

fn default_generator_interval_ms() -> u64 {
    1000
}

fn default_local_path() -> String {
    "/var/log/kafka-anonymizer".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
