//! Telemetry sinks
//!
//! Where replayed messages go: an HTTP ingestion endpoint, an in-process
//! channel, the log, or straight into an inference engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::logic::features::SchemaError;
use crate::logic::model::InferenceEngine;

use super::message::TelemetryMessage;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("sink rejected message: HTTP {0}")]
    Rejected(u16),

    #[error("sink channel closed")]
    Closed,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("engine rejected record: {0}")]
    Schema(#[from] SchemaError),

    #[error("scoring task failed: {0}")]
    Task(String),
}

/// Blocking "send one record": the caller awaits before sending the next
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), SendError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// POSTs each message as JSON
pub struct HttpSink {
    url: String,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SendError::Network(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), SendError> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| SendError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SendError::Rejected(response.status().as_u16()))
        }
    }
}

// ============================================================================
// CHANNEL
// ============================================================================

/// Forwards messages into a bounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TelemetryMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<TelemetryMessage>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TelemetryMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl TelemetrySink for ChannelSink {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), SendError> {
        self.tx
            .send(message.clone())
            .await
            .map_err(|_| SendError::Closed)
    }
}

// ============================================================================
// LOG
// ============================================================================

/// Dry run: prints what would be sent
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl TelemetrySink for LogSink {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), SendError> {
        log::info!("Message sent: {}", serde_json::to_string(message)?);
        Ok(())
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Scores each message locally, one window per vehicle
pub struct EngineSink {
    engine: Arc<InferenceEngine>,
}

impl EngineSink {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TelemetrySink for EngineSink {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), SendError> {
        let engine = Arc::clone(&self.engine);
        let record = message.to_record();
        let entity = message.agv_id.clone();

        let score = tokio::task::spawn_blocking(move || engine.step(&entity, &record))
            .await
            .map_err(|e| SendError::Task(e.to_string()))??;

        match score {
            Some(score) if score.is_degraded() => {
                log::warn!("[{}] {} @ {}: degraded", self.engine.name(), message.agv_id, message.ts)
            }
            Some(score) => log::info!(
                "[{}] {} @ {}: {:.3}",
                self.engine.name(),
                message.agv_id,
                message.ts,
                score.value()
            ),
            None => log::debug!("[{}] {} window filling", self.engine.name(), message.agv_id),
        }

        Ok(())
    }
}
