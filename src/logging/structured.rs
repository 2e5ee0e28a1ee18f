//! Subscriber setup for the anonymizer
//!
//! Console output is always on. When `[logging] local_enabled` is set, the
//! same events are also written as JSON lines to a rolling file in
//! `local_path`, one event per received, dropped or published message.
//!
//! # Example
//!
//! ```no_run
//! use kafka_anonymizer::logging::init_logging;
//! use kafka_anonymizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{AnonymizerError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// File name prefix of the rolling JSON log
pub const LOG_FILE_NAME: &str = "kafka-anonymizer.log";

/// Level for events forwarded by the Kafka client
const CLIENT_LOG_LEVEL: Level = Level::WARN;

/// Keeps the background file writer alive
///
/// Dropping it flushes pending file events.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` replaces the filter built from `level` entirely.
///
/// # Errors
///
/// [`AnonymizerError::Configuration`] for an unknown level, an uncreatable
/// log directory, or a subscriber that is already installed.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(filter())
            .boxed(),
    ];

    let mut file_guard = None;
    let mut log_file = None;
    if config.local_enabled {
        let (layer, guard) = json_file_layer::<Registry>(config)?;
        layers.push(layer.with_filter(filter()).boxed());
        file_guard = Some(guard);
        log_file = Some(Path::new(&config.local_path).join(LOG_FILE_NAME));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| {
            AnonymizerError::Configuration(format!("Failed to install log subscriber: {e}"))
        })?;

    tracing::info!(
        level = %level,
        log_file = ?log_file,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Filter used when `RUST_LOG` is not set
fn filter_directives(level: Level) -> String {
    format!("kafka_anonymizer={level},rdkafka={CLIENT_LOG_LEVEL}").to_lowercase()
}

/// JSON lines with thread info, written through a non-blocking rolling appender
fn json_file_layer<S>(
    config: &LoggingConfig,
) -> Result<(impl Layer<S> + Send + Sync + 'static, WorkerGuard)>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::new(
        parse_rotation(&config.local_rotation),
        &config.local_path,
        LOG_FILE_NAME,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(false)
        .with_thread_names(true)
        .with_writer(writer);

    Ok((layer, guard))
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    level.trim().parse::<Level>().map_err(|_| {
        AnonymizerError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" INFO ").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_filter_directives_quiet_kafka_client() {
        assert_eq!(
            filter_directives(Level::DEBUG),
            "kafka_anonymizer=debug,rdkafka=warn"
        );
        assert!(EnvFilter::try_new(filter_directives(Level::TRACE)).is_ok());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_json_file_layer_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("nested/logs").to_string_lossy().to_string(),
            local_rotation: "never".to_string(),
        };

        let (_layer, guard) = json_file_layer::<Registry>(&config).unwrap();
        drop(guard);

        assert!(dir.path().join("nested/logs").is_dir());
    }
}
