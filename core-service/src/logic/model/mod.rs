//! Model Module - Windowed Inference Pipeline
//!
//! record → schema vector → per-vehicle window → standardize/weight →
//! model → inverse target scaling.
//! Swap the model behind `Model`; the pipeline around it stays the same.

pub mod buffer;
pub mod engine;
pub mod inference;
pub mod manifest;
pub mod postprocess;
pub mod preprocess;
pub mod presets;

#[cfg(test)]
mod tests;

// Re-export common types
pub use buffer::{BufferStatus, WindowBuffer};
pub use engine::{EngineError, EngineStatus, InferenceEngine, Score};
pub use inference::{FnModel, Model, ModelError, OnnxModel};
pub use manifest::{load_engine, ModelManifest, OutputSpec, ScalerSource};
pub use postprocess::Postprocessor;
pub use preprocess::{PreprocessError, Preprocessor, ScalerStats};
