//! Anonymization configuration

use crate::anonymization::hasher::HashAlgorithm;
use crate::anonymization::policy::UnknownTopicPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Anonymization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Digest algorithm name (sha1, sha256, sha512)
    ///
    /// Kept as a string so that an unrecognized value can fall back to
    /// SHA-1 instead of failing the whole configuration.
    #[serde(default = "default_hash_algorithm", alias = "sha")]
    pub hash_algorithm: String,

    /// Handling of topics without a policy entry
    #[serde(default)]
    pub unknown_topic: UnknownTopicPolicy,

    /// Policy key to use instead of the message topic
    #[serde(default)]
    pub schema_override: Option<String>,
}

fn default_hash_algorithm() -> String {
    HashAlgorithm::default().name().to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: default_hash_algorithm(),
            unknown_topic: UnknownTopicPolicy::default(),
            schema_override: None,
        }
    }
}

impl AnonymizationConfig {
    /// Resolved digest algorithm, SHA-1 when unset or unrecognized
    pub fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::from_name_or_default(&self.hash_algorithm)
    }

    /// Validate the configuration
    ///
    /// An unrecognized algorithm is not an error; it resolves to SHA-1.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref schema) = self.schema_override {
            if schema.contains(char::is_whitespace) {
                anyhow::bail!("schema_override must not contain whitespace: '{schema}'");
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("ANONYMIZER_ANONYMIZATION_HASH_ALGORITHM") {
            self.hash_algorithm = val;
        }

        if let Ok(val) = std::env::var("ANONYMIZER_ANONYMIZATION_UNKNOWN_TOPIC") {
            self.unknown_topic = match val.to_lowercase().as_str() {
                "pass_through" | "passthrough" => UnknownTopicPolicy::PassThrough,
                "reject" => UnknownTopicPolicy::Reject,
                _ => anyhow::bail!("Invalid ANONYMIZER_ANONYMIZATION_UNKNOWN_TOPIC: {}", val),
            };
        }

        if let Ok(val) = std::env::var("ANONYMIZER_ANONYMIZATION_SCHEMA_OVERRIDE") {
            self.schema_override = Some(val).filter(|s| !s.is_empty());
        }

        self.validate()
            .context("Invalid anonymization configuration")?;

        Ok(())
    }
}
