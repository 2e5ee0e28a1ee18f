//! Anonymization pipeline - receive, redact and republish loop
//!
//! This module drives one message at a time from a [`MessageSource`] through
//! decoding, redaction and encoding, and hands the result to an optional
//! [`MessageSink`].

use crate::adapters::transport::{MessageSink, MessageSource};
use crate::anonymization::{codec, AnonymizationEngine, PolicyDecision, RedactionReport};
use crate::config::AnonymizerConfig;
use crate::core::pipeline::state::{DropReason, PipelineState, StepOutcome};
use crate::core::pipeline::summary::PipelineSummary;
use crate::domain::errors::TransportError;
use crate::domain::message::{InboundMessage, OutboundMessage, SendIdGenerator};
use crate::{log_error_with_context, log_message_dropped, log_message_published};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Pause after a failed read before polling again
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Anonymization pipeline
///
/// Messages are processed and republished strictly in receive order. The
/// shutdown signal is observed only at the receive boundary, so a message
/// that has been received is always carried through to the end.
pub struct AnonymizePipeline {
    engine: AnonymizationEngine,
    source: Box<dyn MessageSource>,
    sink: Option<Arc<dyn MessageSink>>,
    verbose: u8,
    send_ids: SendIdGenerator,
    state: watch::Sender<PipelineState>,
}

impl AnonymizePipeline {
    /// Create a pipeline
    ///
    /// With `sink` set to `None` the pipeline still decodes and redacts every
    /// message but publishes nothing.
    pub fn new(
        config: &AnonymizerConfig,
        engine: AnonymizationEngine,
        source: Box<dyn MessageSource>,
        sink: Option<Arc<dyn MessageSink>>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            engine,
            source,
            sink,
            verbose: config.application.verbose,
            send_ids: SendIdGenerator::new(),
            state,
        }
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Watch state transitions, including after the pipeline is moved into `run`
    pub fn subscribe_state(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::trace!(from = %previous, to = %next, "Pipeline state changed");
        }
    }

    /// Decode, redact and re-encode one message
    ///
    /// No I/O is performed; the result says whether and what to publish.
    pub fn process_message(&self, message: &InboundMessage) -> StepOutcome {
        let policy = self.engine.policy();
        let schema = policy.schema_key(&message.topic);

        let rules = match self.engine.lookup(&message.topic) {
            PolicyDecision::Reject => {
                return StepOutcome::Dropped(DropReason::RejectedTopic(schema.to_string()));
            }
            PolicyDecision::PassThrough => None,
            PolicyDecision::Apply(rules) => Some(rules),
        };

        self.set_state(PipelineState::Decoding);
        let decoded = match rules {
            Some(rules) if !rules.is_empty() => codec::decode_with_data(&message.payload),
            _ => codec::decode(&message.payload),
        };
        let mut record = match decoded {
            Ok(record) => record,
            Err(e) => return StepOutcome::Dropped(DropReason::Decode(e)),
        };

        if record.metadata().is_none() {
            tracing::debug!(topic = %message.topic, "Record has no metadata section");
        }

        self.set_state(PipelineState::Redacting);
        let report = match rules {
            Some(rules) => self.engine.apply(&mut record, rules),
            None => RedactionReport::new(),
        };

        self.log_field_failures(message, &report);

        self.set_state(PipelineState::Encoding);
        let payload = match codec::encode(&record) {
            Ok(payload) => payload,
            Err(e) => return StepOutcome::Dropped(DropReason::Encode(e)),
        };

        match rules {
            Some(_) => StepOutcome::Redacted { payload, report },
            None => {
                tracing::debug!(schema = %schema, "No policy for schema, passing message through");
                StepOutcome::PassedThrough { payload }
            }
        }
    }

    /// Type mismatches always warn; absent fields are reported at info from
    /// verbosity 1 and at debug otherwise
    fn log_field_failures(&self, message: &InboundMessage, report: &RedactionReport) {
        for mismatch in &report.mismatches {
            tracing::warn!(
                topic = %message.topic,
                offset = message.offset,
                error = %mismatch,
                "Field left unredacted"
            );
        }
        for missing in &report.missing {
            if self.verbose >= 1 {
                tracing::info!(
                    topic = %message.topic,
                    offset = message.offset,
                    field = %missing,
                    "Field not present"
                );
            } else {
                tracing::debug!(
                    topic = %message.topic,
                    offset = message.offset,
                    field = %missing,
                    "Field not present"
                );
            }
        }
    }

    /// Run until the shutdown signal is set or the source closes
    ///
    /// Per-message failures are logged and counted; none of them ends the
    /// loop. Dropping the shutdown sender also stops the pipeline.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> PipelineSummary {
        let start_time = Instant::now();
        let mut summary = PipelineSummary::new();

        tracing::info!(
            receive_topic = %self.source.topic(),
            send_topic = self.sink.as_ref().map(|s| s.topic()).unwrap_or("<none>"),
            algorithm = %self.engine.algorithm(),
            unknown_topic = %self.engine.policy().unknown_topic(),
            "Starting anonymization pipeline"
        );

        loop {
            if *shutdown.borrow_and_update() {
                tracing::info!("Shutdown requested, stopping pipeline");
                break;
            }

            self.set_state(PipelineState::Receiving);
            let received = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tracing::info!("Shutdown signal dropped, stopping pipeline");
                        break;
                    }
                    continue;
                }
                result = self.source.receive() => result,
            };

            match received {
                Ok(Some(message)) => self.handle_message(message, &mut summary).await,
                Ok(None) => {
                    summary.idle_polls += 1;
                    tracing::trace!("No message within poll timeout");
                }
                Err(TransportError::Closed(reason)) => {
                    tracing::warn!(reason = %reason, "Source closed, stopping pipeline");
                    break;
                }
                Err(e) => {
                    summary.receive_errors += 1;
                    log_error_with_context!(&e, "Could not read message");
                    tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                }
            }

            self.set_state(PipelineState::Idle);
        }

        self.set_state(PipelineState::Draining);
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.flush().await {
                log_error_with_context!(&e, "Failed to flush output topic");
            }
        }
        self.set_state(PipelineState::Stopped);

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        summary
    }

    async fn handle_message(&mut self, message: InboundMessage, summary: &mut PipelineSummary) {
        summary.received += 1;

        if self.verbose >= 1 {
            tracing::info!(
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                payload = %message.payload_str(),
                "Received message"
            );
        }

        let outcome = self.process_message(&message);
        summary.record_outcome(&outcome);

        if self.verbose >= 2 {
            if let Some(report) = outcome.report() {
                tracing::info!(
                    topic = %message.topic,
                    offset = message.offset,
                    rules = report.rules_seen(),
                    changed = report.fields_changed(),
                    placeholders = report.placeholders.len(),
                    "Redaction report"
                );
            }
        }

        let payload = match outcome {
            StepOutcome::Dropped(reason) => {
                log_message_dropped!(message.topic, message.partition, message.offset, reason);
                return;
            }
            other => match other.into_payload() {
                Some(payload) => payload,
                None => return,
            },
        };

        if self.verbose >= 2 {
            tracing::info!(
                topic = %message.topic,
                offset = message.offset,
                payload = %String::from_utf8_lossy(&payload),
                "Redacted message"
            );
        }

        let Some(sink) = &self.sink else {
            return;
        };

        self.set_state(PipelineState::Publishing);
        let send_id = self.send_ids.next_id();
        match sink.send(OutboundMessage::new(send_id, payload)).await {
            Ok(()) => {
                summary.published += 1;
                log_message_published!(sink.topic(), send_id);
            }
            Err(e) => {
                summary.publish_failures += 1;
                tracing::error!(
                    topic = %sink.topic(),
                    send_id = send_id,
                    offset = message.offset,
                    error = %e,
                    "Failed to publish message"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemorySink, MemorySource};
    use crate::anonymization::hasher::{redact, HashAlgorithm};
    use crate::anonymization::policy::{SchemaPolicy, UnknownTopicPolicy, CMSSW_POP_TOPIC};
    use crate::config::schema::{
        ApplicationConfig, ConsumerConfig, GeneratorConfig, KafkaConfig, LoggingConfig,
        ProducerConfig, SecurityConfig,
    };
    use crate::domain::errors::DecodeError;
    use serde_json::{json, Value};

    fn config() -> AnonymizerConfig {
        AnonymizerConfig {
            application: ApplicationConfig::default(),
            kafka: KafkaConfig {
                brokers: vec!["localhost:9092".to_string()],
                group: "test".to_string(),
                receive_topic: CMSSW_POP_TOPIC.to_string(),
                send_topic: Some("anon".to_string()),
                consumer: ConsumerConfig::default(),
                producer: ProducerConfig::default(),
                security: SecurityConfig::default(),
            },
            anonymization: Default::default(),
            generator: GeneratorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn pipeline(policy: SchemaPolicy) -> AnonymizePipeline {
        let (source, _feeder) = MemorySource::new(CMSSW_POP_TOPIC, Duration::from_millis(5));
        AnonymizePipeline::new(
            &config(),
            AnonymizationEngine::new(policy, HashAlgorithm::Sha1),
            Box::new(source),
            Some(Arc::new(MemorySink::new("anon"))),
        )
    }

    fn payload_json(outcome: &StepOutcome) -> Value {
        serde_json::from_slice(outcome.payload().unwrap()).unwrap()
    }

    #[test]
    fn test_process_hashes_user_dn() {
        let pipeline = pipeline(SchemaPolicy::builtin());
        let message = InboundMessage::new(
            CMSSW_POP_TOPIC,
            json!({
                "metadata": {"producer": "cmssw"},
                "data": {"user_dn": "CN=Alice", "site_name": "T2_CH_CERN"}
            })
            .to_string(),
        );

        let outcome = pipeline.process_message(&message);
        assert!(matches!(outcome, StepOutcome::Redacted { .. }));
        assert_eq!(
            payload_json(&outcome),
            json!({
                "metadata": {"producer": "cmssw"},
                "data": {"user_dn": redact("CN=Alice", HashAlgorithm::Sha1), "site_name": "T2_CH_CERN"}
            })
        );
        assert_eq!(pipeline.state(), PipelineState::Encoding);
    }

    #[test]
    fn test_process_malformed_is_dropped() {
        let pipeline = pipeline(SchemaPolicy::builtin());
        let outcome = pipeline.process_message(&InboundMessage::new(CMSSW_POP_TOPIC, "not json"));
        assert!(matches!(
            outcome,
            StepOutcome::Dropped(DropReason::Decode(DecodeError::Malformed(_)))
        ));
    }

    #[test]
    fn test_process_requires_data_section_for_known_topic() {
        let pipeline = pipeline(SchemaPolicy::builtin());
        let outcome =
            pipeline.process_message(&InboundMessage::new(CMSSW_POP_TOPIC, r#"{"metadata": {}}"#));
        assert!(matches!(
            outcome,
            StepOutcome::Dropped(DropReason::Decode(DecodeError::MissingSection(_)))
        ));
    }

    #[test]
    fn test_process_unknown_topic() {
        let passthrough = pipeline(SchemaPolicy::builtin());
        let message = InboundMessage::new("other_topic", r#"{"user":"bob"}"#);
        let outcome = passthrough.process_message(&message);
        assert!(matches!(outcome, StepOutcome::PassedThrough { .. }));
        assert_eq!(payload_json(&outcome), json!({"user": "bob"}));

        let strict =
            pipeline(SchemaPolicy::builtin().with_unknown_topic(UnknownTopicPolicy::Reject));
        assert!(matches!(
            strict.process_message(&message),
            StepOutcome::Dropped(DropReason::RejectedTopic(_))
        ));
    }

    #[test]
    fn test_process_schema_override() {
        let policy =
            SchemaPolicy::builtin().with_schema_override(Some(CMSSW_POP_TOPIC.to_string()));
        let pipeline = pipeline(policy);
        let outcome = pipeline.process_message(&InboundMessage::new(
            "cmssw_pop_input",
            r#"{"data":{"user_dn":"CN=Bob"}}"#,
        ));
        assert_eq!(
            payload_json(&outcome)["data"]["user_dn"],
            redact("CN=Bob", HashAlgorithm::Sha1)
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Info-and-above output of processing `payload` at `verbose`
    fn info_logs(verbose: u8, payload: &str) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let mut config = config();
        config.application.verbose = verbose;
        let (source, _feeder) = MemorySource::new(CMSSW_POP_TOPIC, Duration::from_millis(5));
        let pipeline = AnonymizePipeline::new(
            &config,
            AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha1),
            Box::new(source),
            None,
        );

        tracing::subscriber::with_default(subscriber, || {
            pipeline.process_message(&InboundMessage::new(CMSSW_POP_TOPIC, payload));
        });

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_missing_field_log_level_follows_verbosity() {
        let payload = r#"{"data":{"site_name":"T2_CH_CERN"}}"#;
        assert!(!info_logs(0, payload).contains("Field not present"));

        let verbose = info_logs(1, payload);
        assert!(verbose.contains("Field not present"));
        assert!(verbose.contains("data.user_dn"));
    }

    #[test]
    fn test_type_mismatch_warns_at_any_verbosity() {
        let logs = info_logs(0, r#"{"data":{"user_dn":42}}"#);
        assert!(logs.contains("Field left unredacted"));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (source, _feeder) = MemorySource::new(CMSSW_POP_TOPIC, Duration::from_millis(5));
        let pipeline = AnonymizePipeline::new(
            &config(),
            AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha1),
            Box::new(source),
            None,
        );
        let state = pipeline.subscribe_state();
        let (shutdown_tx, shutdown_rx) = watch::channel(true);

        let summary = pipeline.run(shutdown_rx).await;
        assert_eq!(summary.received, 0);
        assert_eq!(*state.borrow(), PipelineState::Stopped);
        drop(shutdown_tx);
    }
}
