//! Inference Engine - record → window → score
//!
//! One engine per deployed model. It owns the per-vehicle window buffers,
//! the schema, the preprocessing stats and a handle to the model.
//!
//! Model failures never escape `step`: they come back as
//! `Score::Degraded`, which reads as 0.0 but is tagged so callers can tell
//! it apart from a genuine zero.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::{FeatureSchema, SchemaError, TelemetryRecord};

use super::buffer::{BufferStatus, WindowBuffer};
use super::inference::{Model, ModelError};
use super::postprocess::Postprocessor;
use super::preprocess::{PreprocessError, Preprocessor};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Result of one scoring pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "score", rename_all = "snake_case")]
pub enum Score {
    /// Model output (postprocessed for regressors, raw label for classifiers)
    Value(f32),
    /// Model could not run; reported as 0.0
    Degraded,
}

impl Score {
    /// Numeric score; 0.0 when degraded
    pub fn value(&self) -> f32 {
        match self {
            Score::Value(v) => *v,
            Score::Degraded => 0.0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Score::Degraded)
    }
}

/// Engine status for APIs/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub history: usize,
    pub feature_count: usize,
    pub layout_hash: u32,
    pub regression: bool,
    pub active_entities: usize,
    pub inference_count: u64,
    pub degraded_count: u64,
    pub avg_latency_ms: f32,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("history length must be at least 1")]
    ZeroHistory,

    #[error("scaler has {stats} features but schema declares {schema}")]
    FeatureCountMismatch { schema: usize, stats: usize },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("manifest {path}: {message}")]
    Manifest { path: String, message: String },
}

/// Why a scoring pass degraded
#[derive(Debug, Error)]
enum DegradeCause {
    #[error("window shape {actual:?}, expected {expected:?}")]
    WindowShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("unparsable payload: {0}")]
    Payload(String),

    #[error("request carried no window payload")]
    MissingPayload,

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct InferenceEngine {
    name: String,
    schema: FeatureSchema,
    history: usize,
    preprocessor: Preprocessor,
    postprocessor: Option<Postprocessor>,
    model: Arc<dyn Model>,

    buffers: RwLock<HashMap<String, Arc<Mutex<WindowBuffer>>>>,

    inference_count: AtomicU64,
    degraded_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("history", &self.history)
            .field("features", &self.schema.len())
            .finish()
    }
}

impl InferenceEngine {
    /// Assemble an engine. Shapes are checked once here so `step` never has to.
    pub fn new(
        name: impl Into<String>,
        schema: FeatureSchema,
        history: usize,
        preprocessor: Preprocessor,
        postprocessor: Option<Postprocessor>,
        model: Arc<dyn Model>,
    ) -> Result<Self, EngineError> {
        if history == 0 {
            return Err(EngineError::ZeroHistory);
        }
        if preprocessor.feature_count() != schema.len() {
            return Err(EngineError::FeatureCountMismatch {
                schema: schema.len(),
                stats: preprocessor.feature_count(),
            });
        }

        let name = name.into();
        log::info!(
            "Inference engine '{}' ready: model={}, H={}, F={}, layout={:08x}, {}",
            name,
            model.name(),
            history,
            schema.len(),
            schema.layout_hash(),
            if postprocessor.is_some() { "regression" } else { "classification" }
        );

        Ok(Self {
            name,
            schema,
            history,
            preprocessor,
            postprocessor,
            model,
            buffers: RwLock::new(HashMap::new()),
            inference_count: AtomicU64::new(0),
            degraded_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn history(&self) -> usize {
        self.history
    }

    pub fn is_regression(&self) -> bool {
        self.postprocessor.is_some()
    }

    /// Feed one record for one vehicle.
    ///
    /// `Ok(None)` while the vehicle's window is still filling. Calls for the
    /// same entity are serialized on that entity's buffer lock.
    pub fn step(
        &self,
        entity_id: &str,
        record: &TelemetryRecord,
    ) -> Result<Option<Score>, SchemaError> {
        let features = self.schema.validate(record)?;

        let buffer = self.buffer_for(entity_id);
        let mut buffer = buffer.lock();
        buffer.push(features);

        let Some(window) = buffer.snapshot() else {
            log::debug!(
                "[{}] {} warming up ({}/{})",
                self.name,
                entity_id,
                buffer.len(),
                self.history
            );
            return Ok(None);
        };

        Ok(Some(self.score_window(window.view())))
    }

    /// Score a complete `[H, F]` window without touching any buffer
    pub fn score_window(&self, window: ArrayView2<'_, f32>) -> Score {
        let start = Instant::now();
        let result = self.run_model(window);
        self.finish(start, result)
    }

    /// Score a single record statelessly (H = 1 models)
    pub fn score_record(&self, record: &TelemetryRecord) -> Result<Score, SchemaError> {
        let features = self.schema.validate(record)?;
        let window = Array1::from(features).insert_axis(Axis(0));
        Ok(self.score_window(window.view()))
    }

    /// Score a JSON-encoded `[H, F]` numeric array.
    ///
    /// Anything that does not decode into exactly that shape degrades.
    pub fn score_payload(&self, data: &str) -> Score {
        let start = Instant::now();
        let result = self
            .decode_payload(data)
            .and_then(|window| self.run_model(window.view()));
        self.finish(start, result)
    }

    /// Degraded score for a request that carried no window at all
    pub fn score_missing_payload(&self) -> Score {
        self.finish(Instant::now(), Err(DegradeCause::MissingPayload))
    }

    /// Drop a vehicle's window (session ended). Returns whether it existed.
    pub fn end_session(&self, entity_id: &str) -> bool {
        let removed = self.buffers.write().remove(entity_id).is_some();
        if removed {
            log::info!("[{}] session ended for {}", self.name, entity_id);
        }
        removed
    }

    pub fn buffer_status(&self, entity_id: &str) -> Option<BufferStatus> {
        let buffer = self.buffers.read().get(entity_id).cloned()?;
        let status = buffer.lock().status();
        Some(status)
    }

    pub fn entity_count(&self) -> usize {
        self.buffers.read().len()
    }

    pub fn status(&self) -> EngineStatus {
        let count = self.inference_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.model.name().to_string(),
            history: self.history,
            feature_count: self.schema.len(),
            layout_hash: self.schema.layout_hash(),
            regression: self.is_regression(),
            active_entities: self.entity_count(),
            inference_count: count,
            degraded_count: self.degraded_count.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }

    // ------------------------------------------------------------------------

    fn buffer_for(&self, entity_id: &str) -> Arc<Mutex<WindowBuffer>> {
        if let Some(buffer) = self.buffers.read().get(entity_id) {
            return Arc::clone(buffer);
        }

        let mut buffers = self.buffers.write();
        let buffer = buffers.entry(entity_id.to_string()).or_insert_with(|| {
            log::debug!("[{}] new window buffer for {}", self.name, entity_id);
            Arc::new(Mutex::new(WindowBuffer::new(self.history, self.schema.len())))
        });
        Arc::clone(buffer)
    }

    fn decode_payload(&self, data: &str) -> Result<Array2<f32>, DegradeCause> {
        let rows: Vec<Vec<f32>> =
            serde_json::from_str(data).map_err(|e| DegradeCause::Payload(e.to_string()))?;

        let expected = (self.history, self.schema.len());
        let actual = (rows.len(), rows.first().map_or(0, Vec::len));
        if actual != expected || rows.iter().any(|r| r.len() != expected.1) {
            return Err(DegradeCause::WindowShape { expected, actual });
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec(expected, flat).map_err(|e| DegradeCause::Payload(e.to_string()))
    }

    /// Steps 4-7: reshape, preprocess, predict, postprocess
    fn run_model(&self, window: ArrayView2<'_, f32>) -> Result<Score, DegradeCause> {
        let expected = (self.history, self.schema.len());
        if window.dim() != expected {
            return Err(DegradeCause::WindowShape {
                expected,
                actual: window.dim(),
            });
        }

        let input = window.insert_axis(Axis(0));
        let scaled = self.preprocessor.transform(input)?;
        let output = self.model.predict(scaled.view())?;

        let raw = match output.first() {
            Some(v) if v.is_finite() => *v,
            Some(v) => {
                return Err(ModelError::MalformedOutput(format!("non-finite output {}", v)).into())
            }
            None => return Err(ModelError::MalformedOutput("empty output".to_string()).into()),
        };

        Ok(Score::Value(match &self.postprocessor {
            Some(post) => post.invert(raw),
            None => raw,
        }))
    }

    fn finish(&self, start: Instant, result: Result<Score, DegradeCause>) -> Score {
        let score = result.unwrap_or_else(|cause| {
            log::warn!("[{}] degraded to zero: {}", self.name, cause);
            self.degraded_count.fetch_add(1, Ordering::Relaxed);
            Score::Degraded
        });

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        score
    }
}
