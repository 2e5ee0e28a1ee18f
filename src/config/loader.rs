//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{AnonymizerConfig, LegacyConfig, StartOffset};
use crate::config::secret_string;
use crate::domain::errors::AnonymizerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses it into [`AnonymizerConfig`]; a `.json` file is read as the
///    flat legacy layout
/// 4. Applies environment variable overrides (ANONYMIZER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`AnonymizerError::Configuration`] if:
/// - File cannot be read
/// - Parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use kafka_anonymizer::config::loader::load_config;
///
/// let config = load_config("anonymizer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnonymizerConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(AnonymizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let is_legacy = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut config = if is_legacy {
        parse_legacy(&contents)?
    } else {
        parse_toml(&contents)?
    };

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnonymizerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Parses the TOML layout
pub fn parse_toml(contents: &str) -> Result<AnonymizerConfig> {
    toml::from_str(contents)
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to parse TOML: {}", e)))
}

/// Parses the flat JSON layout used by existing deployments
pub fn parse_legacy(contents: &str) -> Result<AnonymizerConfig> {
    let legacy: LegacyConfig = serde_json::from_str(contents).map_err(|e| {
        AnonymizerError::Configuration(format!("Failed to parse JSON configuration: {}", e))
    })?;
    Ok(legacy.into())
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid pattern"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Lines starting with `#` are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| AnonymizerError::Configuration(format!("Invalid value for {name}: '{val}'")))
}

/// Applies environment variable overrides using ANONYMIZER_* prefix
///
/// Environment variables follow the pattern: ANONYMIZER_<SECTION>_<KEY>
/// For example: ANONYMIZER_KAFKA_BROKERS, ANONYMIZER_APPLICATION_VERBOSE
fn apply_env_overrides(config: &mut AnonymizerConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("ANONYMIZER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_APPLICATION_VERBOSE") {
        config.application.verbose = parse_env("ANONYMIZER_APPLICATION_VERBOSE", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_APPLICATION_PRODUCE") {
        config.application.produce = val.parse().unwrap_or(false);
    }

    // Kafka overrides
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_BROKERS") {
        config.kafka.brokers = val
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect();
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_GROUP") {
        config.kafka.group = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_RECEIVE_TOPIC") {
        config.kafka.receive_topic = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_SEND_TOPIC") {
        config.kafka.send_topic = Some(val).filter(|t| !t.is_empty());
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_CONSUMER_MAX_WAIT_MS") {
        config.kafka.consumer.max_wait_ms = parse_env("ANONYMIZER_KAFKA_CONSUMER_MAX_WAIT_MS", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_CONSUMER_START_OFFSET") {
        config.kafka.consumer.start_offset = match val.to_lowercase().as_str() {
            "earliest" => StartOffset::Earliest,
            "latest" => StartOffset::Latest,
            _ => {
                return Err(AnonymizerError::Configuration(format!(
                    "Invalid value for ANONYMIZER_KAFKA_CONSUMER_START_OFFSET: '{val}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_PRODUCER_REQUIRED_ACKS") {
        config.kafka.producer.required_acks =
            parse_env("ANONYMIZER_KAFKA_PRODUCER_REQUIRED_ACKS", &val)?;
    }

    // Security overrides
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_SECURITY_PROTOCOL") {
        config.kafka.security.protocol = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_SECURITY_SASL_MECHANISM") {
        config.kafka.security.sasl_mechanism = Some(val);
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_SECURITY_SASL_USERNAME") {
        config.kafka.security.sasl_username = Some(val);
    }
    if let Ok(val) = std::env::var("ANONYMIZER_KAFKA_SECURITY_SASL_PASSWORD") {
        config.kafka.security.sasl_password = Some(secret_string(val));
    }

    // Anonymization overrides
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| AnonymizerError::Configuration(format!("{e:#}")))?;

    // Generator overrides
    if let Ok(val) = std::env::var("ANONYMIZER_GENERATOR_INTERVAL_MS") {
        config.generator.interval_ms = parse_env("ANONYMIZER_GENERATOR_INTERVAL_MS", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
