//! AGV Health Core
//!
//! Windowed telemetry inference for industrial mobile robots, plus the
//! replay ingestor that streams historical telemetry into a sink.
//!
//! ## Structure
//! - `logic/features/` - Feature schema, typed values, signal catalogue
//! - `logic/model/` - Window buffers, pre/post-processing, inference engine
//! - `logic/replay/` - Historical replay (source, casting, dedup, sinks)

pub mod constants;
pub mod logic;

pub use ndarray;

pub use logic::features::{FeatureKind, FeatureSchema, FeatureValue, SchemaError, TelemetryRecord};
pub use logic::model::{
    BufferStatus, EngineError, EngineStatus, FnModel, InferenceEngine, Model, ModelError,
    ModelManifest, OnnxModel, Score,
};
pub use logic::replay::{
    ColumnMapping, ReplayConfig, ReplayError, ReplayHandle, ReplayIngestor, ReplayStats,
    TelemetryMessage, TelemetrySink,
};
