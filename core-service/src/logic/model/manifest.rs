//! Model Manifest - artifact layout on disk
//!
//! A model directory holds, per model:
//! - `<name>.json`: this manifest (optional for built-in presets)
//! - the ONNX graph named by `model_file`
//! - optionally a scaler stats JSON when `scaler` points at a file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureSchema, FeatureSpec, SchemaError};

use super::engine::{EngineError, InferenceEngine};
use super::inference::{Model, OnnxModel};
use super::postprocess::Postprocessor;
use super::preprocess::{Preprocessor, ScalerStats};
use super::presets;

fn default_layout_version() -> u8 {
    1
}

/// Where the preprocessing statistics come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalerSource {
    /// Separate JSON file, relative to the model directory
    File { file: String },
    Inline(ScalerStats),
}

/// What the model emits
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSpec {
    /// Raw label, passed through untouched
    #[default]
    Classification,
    /// Standardized target, inverted with the training mean/scale
    Regression { mean: f64, scale: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    pub model_file: String,
    pub history: usize,
    #[serde(default = "default_layout_version")]
    pub layout_version: u8,
    pub features: Vec<FeatureSpec>,
    pub scaler: ScalerSource,
    #[serde(default)]
    pub output: OutputSpec,
}

impl ModelManifest {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| manifest_error(path, e))?;
        serde_json::from_str(&content).map_err(|e| manifest_error(path, e))
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| manifest_error(path, e))?;
        std::fs::write(path, content).map_err(|e| manifest_error(path, e))
    }

    /// `<model_dir>/<name>.json`
    pub fn path_for(model_dir: &Path, name: &str) -> PathBuf {
        model_dir.join(format!("{}.json", name))
    }

    /// Manifest file if present, built-in preset otherwise
    pub fn resolve(model_dir: &Path, name: &str) -> Result<Self, EngineError> {
        let path = Self::path_for(model_dir, name);
        if path.exists() {
            return Self::load(&path);
        }

        presets::preset(name).ok_or_else(|| EngineError::Manifest {
            path: path.display().to_string(),
            message: "no manifest file and no built-in preset".to_string(),
        })
    }

    pub fn schema(&self) -> Result<FeatureSchema, SchemaError> {
        FeatureSchema::new(self.layout_version, self.features.clone())
    }

    pub fn scaler_stats(&self, model_dir: &Path) -> Result<ScalerStats, EngineError> {
        match &self.scaler {
            ScalerSource::Inline(stats) => Ok(stats.clone()),
            ScalerSource::File { file } => Ok(ScalerStats::load(&model_dir.join(file))?),
        }
    }

    pub fn postprocessor(&self) -> Option<Postprocessor> {
        match self.output {
            OutputSpec::Regression { mean, scale } => Some(Postprocessor::new(mean, scale)),
            OutputSpec::Classification => None,
        }
    }

    pub fn model_path(&self, model_dir: &Path) -> PathBuf {
        model_dir.join(&self.model_file)
    }
}

fn manifest_error(path: &Path, e: impl std::fmt::Display) -> EngineError {
    EngineError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl InferenceEngine {
    /// Build an engine from a manifest around an already-loaded model
    pub fn init(
        manifest: &ModelManifest,
        model_dir: &Path,
        model: Arc<dyn Model>,
    ) -> Result<Self, EngineError> {
        let schema = manifest.schema()?;
        let preprocessor = Preprocessor::new(manifest.scaler_stats(model_dir)?)?;

        Self::new(
            manifest.name.clone(),
            schema,
            manifest.history,
            preprocessor,
            manifest.postprocessor(),
            model,
        )
    }
}

/// Resolve the manifest for `name`, load its ONNX graph and build the engine
pub fn load_engine(model_dir: &Path, name: &str) -> Result<InferenceEngine, EngineError> {
    let manifest = ModelManifest::resolve(model_dir, name)?;
    let model = OnnxModel::load(&manifest.model_path(model_dir))?;
    InferenceEngine::init(&manifest, model_dir, Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureKind;
    use ndarray::ArrayView3;

    fn manifest() -> ModelManifest {
        ModelManifest {
            name: "tiny".to_string(),
            model_file: "tiny.onnx".to_string(),
            history: 2,
            layout_version: 1,
            features: vec![
                FeatureSpec::new("a", FeatureKind::Float),
                FeatureSpec::new("b", FeatureKind::Boolean),
            ],
            scaler: ScalerSource::File {
                file: "tiny.scaler.json".to_string(),
            },
            output: OutputSpec::Regression {
                mean: 10.0,
                scale: 2.0,
            },
        }
    }

    #[test]
    fn test_manifest_json_shape() {
        let json = r#"{
            "name": "wheel",
            "model_file": "wheel.onnx",
            "history": 1,
            "features": [{"name": "speed", "kind": "float"}],
            "scaler": {"mean": [0.0], "scale": [1.0]}
        }"#;

        let parsed: ModelManifest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.layout_version, 1);
        assert_eq!(parsed.output, OutputSpec::Classification);
        assert!(matches!(parsed.scaler, ScalerSource::Inline(_)));
        assert!(parsed.postprocessor().is_none());
    }

    #[test]
    fn test_save_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let original = manifest();
        original
            .save(&ModelManifest::path_for(dir.path(), "tiny"))
            .unwrap();

        let loaded = ModelManifest::resolve(dir.path(), "tiny").unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.model_path(dir.path()), dir.path().join("tiny.onnx"));
    }

    #[test]
    fn test_resolve_falls_back_to_preset() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = ModelManifest::resolve(dir.path(), presets::POWER_MODEL).unwrap();
        assert_eq!(resolved.history, presets::POWER_HISTORY);

        let err = ModelManifest::resolve(dir.path(), "nope").unwrap_err();
        assert!(matches!(err, EngineError::Manifest { .. }));
    }

    #[test]
    fn test_init_reads_scaler_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tiny.scaler.json"),
            r#"{"mean":[10.0,0.0],"scale":[2.0,1.0]}"#,
        )
        .unwrap();

        let model = Arc::new(crate::logic::model::FnModel::new("zero", |_: ArrayView3<'_, f32>| Ok(vec![0.0])));
        let engine = InferenceEngine::init(&manifest(), dir.path(), model).unwrap();
        assert_eq!(engine.history(), 2);
        assert!(engine.is_regression());
    }

    #[test]
    fn test_missing_scaler_file_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(crate::logic::model::FnModel::new("zero", |_: ArrayView3<'_, f32>| Ok(vec![0.0])));
        let err = InferenceEngine::init(&manifest(), dir.path(), model).unwrap_err();
        assert!(matches!(err, EngineError::Preprocess(_)));
    }

    #[test]
    fn test_load_engine_without_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_engine(dir.path(), presets::POWER_MODEL).unwrap_err();
        assert!(matches!(err, EngineError::Model(_)));
    }
}
