//! Inference - Model capability & ONNX Runtime Integration
//!
//! The engine only needs something that maps `[B, H, F]` to `B` scores.
//! `OnnxModel` is the production implementation; `FnModel` wraps any
//! closure (stubs, heuristics, tests).

use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayView3, Axis};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use thiserror::Error;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Predict capability: `[B, H, F]` → one score (or label) per batch row
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, input: ArrayView3<'_, f32>) -> Result<Vec<f32>, ModelError>;
}

// ============================================================================
// CLOSURE MODEL
// ============================================================================

/// Model backed by a plain function object
pub struct FnModel<F> {
    name: String,
    predict: F,
}

impl<F> FnModel<F>
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Vec<f32>, ModelError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, predict: F) -> Self {
        Self {
            name: name.into(),
            predict,
        }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Vec<f32>, ModelError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: ArrayView3<'_, f32>) -> Result<Vec<f32>, ModelError> {
        (self.predict)(input)
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Shape the graph's first input declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputLayout {
    /// `[B, H, F]` (sequence models)
    Sequence,
    /// `[B, F]` (single-step estimators such as exported tree ensembles)
    Flat,
}

impl InputLayout {
    fn from_rank(rank: Option<usize>) -> Self {
        match rank {
            Some(2) => InputLayout::Flat,
            _ => InputLayout::Sequence,
        }
    }
}

/// `[B, 1, F]` → `[B, F]`
fn flatten_single_step(input: ArrayView3<'_, f32>) -> Result<Array2<f32>, ModelError> {
    let history = input.len_of(Axis(1));
    if history != 1 {
        return Err(ModelError::Inference(format!(
            "model takes [batch, features] input but the window holds {} rows",
            history
        )));
    }
    Ok(input.index_axis(Axis(1), 0).to_owned())
}

/// ONNX Runtime session behind the `Model` trait.
///
/// `Session::run` needs exclusive access, so calls are serialized.
pub struct OnnxModel {
    name: String,
    session: Mutex<Session>,
    output_name: String,
    layout: InputLayout,
}

impl OnnxModel {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Load(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Load(format!("Failed to load model: {}", e)))?;

        let name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        Self::from_session(name, session)
    }

    /// Load ONNX model from bytes
    pub fn load_from_bytes(name: impl Into<String>, model_bytes: &[u8]) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Load(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Load(format!("Load from memory error: {}", e)))?;

        Self::from_session(name.into(), session)
    }

    fn from_session(name: String, session: Session) -> Result<Self, ModelError> {
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Load("No output defined".to_string()))?;

        let rank = session
            .inputs
            .first()
            .and_then(|i| i.input_type.tensor_shape())
            .map(|shape| shape.len());
        let layout = InputLayout::from_rank(rank);

        log::info!(
            "ONNX model '{}' loaded (output: {}, input: {:?})",
            name,
            output_name,
            layout
        );

        Ok(Self {
            name,
            session: Mutex::new(session),
            output_name,
            layout,
        })
    }
}

impl Model for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: ArrayView3<'_, f32>) -> Result<Vec<f32>, ModelError> {
        let input_tensor = match self.layout {
            InputLayout::Sequence => Value::from_array(input.to_owned()),
            InputLayout::Flat => Value::from_array(flatten_single_step(input)?),
        }
        .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::MalformedOutput("No output".to_string()))?;

        // Regressors emit floats; tree classifiers exported to ONNX emit int64 labels
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.to_vec());
        }

        let (_, labels) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| ModelError::MalformedOutput(format!("Extract error: {}", e)))?;

        Ok(labels.iter().map(|&label| label as f32).collect())
    }
}
