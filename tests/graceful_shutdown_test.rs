//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - A shutdown signal stops the pipeline at the receive boundary
//! - Messages received before the signal are fully published
//! - The pipeline ends in the `Stopped` state with a summary
//! - The message generator honours the same signal

use kafka_anonymizer::adapters::memory::{MemorySink, MemorySource};
use kafka_anonymizer::anonymization::AnonymizationEngine;
use kafka_anonymizer::config::loader::parse_toml;
use kafka_anonymizer::config::AnonymizerConfig;
use kafka_anonymizer::core::generator::MessageGenerator;
use kafka_anonymizer::core::pipeline::{AnonymizePipeline, PipelineState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn config() -> AnonymizerConfig {
    parse_toml(
        r#"
[kafka]
brokers = ["localhost:9092"]
group = "shutdown"
receive_topic = "cmssw_pop_raw_metric"
send_topic = "cmssw_pop_anon_metric"
"#,
    )
    .unwrap()
}

async fn wait_for_published(sink: &MemorySink, count: usize) {
    tokio::time::timeout(TEST_TIMEOUT, async {
        while sink.published().await.len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("messages were not published in time");
}

#[tokio::test]
async fn test_shutdown_mid_run_returns_summary() {
    let config = config();
    let sink = MemorySink::new("cmssw_pop_anon_metric");
    let (source, feeder) = MemorySource::new("cmssw_pop_raw_metric", Duration::from_millis(20));

    let pipeline = AnonymizePipeline::new(
        &config,
        AnonymizationEngine::from_config(&config.anonymization),
        Box::new(source),
        Some(Arc::new(sink.clone())),
    );
    let state = pipeline.subscribe_state();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(pipeline.run(shutdown_rx));

    for i in 0..3 {
        feeder
            .push(format!(r#"{{"data":{{"user_dn":"CN=user{i}"}}}}"#))
            .await
            .unwrap();
    }
    wait_for_published(&sink, 3).await;

    // The feeder stays alive, so only the signal can end the run
    shutdown_tx.send(true).unwrap();
    let summary = tokio::time::timeout(TEST_TIMEOUT, handle)
        .await
        .expect("pipeline did not stop")
        .unwrap();

    assert_eq!(summary.received, 3);
    assert_eq!(summary.published, 3);
    assert_eq!(*state.borrow(), PipelineState::Stopped);
    drop(feeder);
}

#[tokio::test]
async fn test_shutdown_before_start_processes_nothing() {
    let config = config();
    let sink = MemorySink::new("cmssw_pop_anon_metric");
    let (source, feeder) = MemorySource::new("cmssw_pop_raw_metric", Duration::from_millis(20));
    feeder.push(r#"{"data":{"user_dn":"CN=Alice"}}"#).await.unwrap();

    let pipeline = AnonymizePipeline::new(
        &config,
        AnonymizationEngine::from_config(&config.anonymization),
        Box::new(source),
        Some(Arc::new(sink.clone())),
    );
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);
    let summary = pipeline.run(shutdown_rx).await;

    assert_eq!(summary.received, 0);
    assert!(sink.published().await.is_empty());
}

#[tokio::test]
async fn test_dropped_signal_sender_stops_pipeline() {
    let config = config();
    let (source, _feeder) = MemorySource::new("cmssw_pop_raw_metric", Duration::from_millis(20));

    let pipeline = AnonymizePipeline::new(
        &config,
        AnonymizationEngine::from_config(&config.anonymization),
        Box::new(source),
        None,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(pipeline.run(shutdown_rx));

    drop(shutdown_tx);
    let summary = tokio::time::timeout(TEST_TIMEOUT, handle)
        .await
        .expect("pipeline did not stop")
        .unwrap();

    assert_eq!(summary.published, 0);
}

#[tokio::test]
async fn test_generator_stops_on_signal() {
    let sink = MemorySink::new("cmssw_pop_anon_metric");
    let generator = MessageGenerator::new(Arc::new(sink.clone()), Duration::from_millis(5));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(generator.run(None, shutdown_rx));

    wait_for_published(&sink, 2).await;
    shutdown_tx.send(true).unwrap();

    let summary = tokio::time::timeout(TEST_TIMEOUT, handle)
        .await
        .expect("generator did not stop")
        .unwrap();

    assert!(summary.messages >= 2);
    assert_eq!(summary.failures, 0);
    assert_eq!(sink.published().await.len() as u64, summary.messages);
}
