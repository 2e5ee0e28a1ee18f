//! Shared client settings
//!
//! Connection and security properties common to the reader and the writer.

use crate::config::schema::KafkaConfig;
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use secrecy::ExposeSecret;

/// Client identifier reported to the brokers
pub const CLIENT_ID: &str = concat!("kafka-anonymizer/", env!("CARGO_PKG_VERSION"));

/// Build a client configuration with bootstrap and security properties set
pub fn base_client_config(config: &KafkaConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", config.bootstrap_servers())
        .set("client.id", CLIENT_ID)
        .set("security.protocol", &config.security.protocol)
        .set_log_level(RDKafkaLogLevel::Warning);

    if let Some(ref mechanism) = config.security.sasl_mechanism {
        client.set("sasl.mechanisms", mechanism);
    }
    if let Some(ref username) = config.security.sasl_username {
        client.set("sasl.username", username);
    }
    if let Some(ref password) = config.security.sasl_password {
        let password: &str = password.expose_secret().as_ref();
        client.set("sasl.password", password);
    }

    client
}
