//! Preprocessing - standardization + learned feature weighting
//!
//! Must reproduce the training pipeline exactly:
//! flatten `[B, H, F]` → `[B*H, F]`, standardize per feature with the
//! training mean/scale, reshape back, multiply by the weight vector.

use std::path::Path;

use ndarray::{Array1, Array3, ArrayView3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("degenerate scale for feature {feature}: {scale}")]
    DegenerateScale { feature: usize, scale: f32 },

    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("input has {actual} features, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("reshape failed: {0}")]
    Reshape(#[from] ndarray::ShapeError),

    #[error("failed to read scaler stats: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scaler stats: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Training-time statistics, as exported next to the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerStats {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
    /// Learned per-feature weights; absent for models trained without them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f32>>,
}

impl ScalerStats {
    /// Load stats from a JSON file
    pub fn load(path: &Path) -> Result<Self, PreprocessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Zero mean, unit scale, no weights
    pub fn identity(feature_count: usize) -> Self {
        Self {
            mean: vec![0.0; feature_count],
            scale: vec![1.0; feature_count],
            weights: None,
        }
    }
}

/// Immutable standardize-then-weight transform
#[derive(Debug, Clone)]
pub struct Preprocessor {
    mean: Array1<f32>,
    scale: Array1<f32>,
    weights: Option<Array1<f32>>,
}

impl Preprocessor {
    pub fn new(stats: ScalerStats) -> Result<Self, PreprocessError> {
        let expected = stats.mean.len();

        if stats.scale.len() != expected {
            return Err(PreprocessError::LengthMismatch {
                field: "scale",
                expected,
                actual: stats.scale.len(),
            });
        }
        if let Some(weights) = &stats.weights {
            if weights.len() != expected {
                return Err(PreprocessError::LengthMismatch {
                    field: "weights",
                    expected,
                    actual: weights.len(),
                });
            }
        }

        if let Some((feature, &scale)) = stats
            .scale
            .iter()
            .enumerate()
            .find(|(_, s)| **s == 0.0 || !s.is_finite())
        {
            return Err(PreprocessError::DegenerateScale { feature, scale });
        }

        Ok(Self {
            mean: Array1::from(stats.mean),
            scale: Array1::from(stats.scale),
            weights: stats.weights.map(Array1::from),
        })
    }

    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    /// `[B, H, F]` → standardized and weighted `[B, H, F]`
    pub fn transform(&self, input: ArrayView3<'_, f32>) -> Result<Array3<f32>, PreprocessError> {
        let (b, h, f) = input.dim();
        if f != self.feature_count() {
            return Err(PreprocessError::ShapeMismatch {
                expected: self.feature_count(),
                actual: f,
            });
        }

        let flat = input.to_owned().into_shape_with_order((b * h, f))?;
        let standardized = (&flat - &self.mean) / &self.scale;
        let mut output = standardized.into_shape_with_order((b, h, f))?;

        if let Some(weights) = &self.weights {
            output *= weights;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(ScalerStats {
            mean: vec![331.105838, 10.0],
            scale: vec![73.6188028, 2.0],
            weights: Some(vec![0.94434573, -1.5]),
        })
        .unwrap()
    }

    #[test]
    fn test_mean_maps_to_zero() {
        let input = array![[[331.105838f32, 10.0]]];
        let output = preprocessor().transform(input.view()).unwrap();

        assert!(output[[0, 0, 0]].abs() < 1e-5);
        assert!(output[[0, 0, 1]].abs() < 1e-5);
    }

    #[test]
    fn test_one_scale_above_mean_maps_to_weight() {
        let input = array![[[331.105838f32 + 73.6188028, 12.0]]];
        let output = preprocessor().transform(input.view()).unwrap();

        assert!((output[[0, 0, 0]] - 0.94434573).abs() < 1e-5);
        assert!((output[[0, 0, 1]] + 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_weights_broadcast_over_batch_and_history() {
        let pre = Preprocessor::new(ScalerStats {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
            weights: Some(vec![2.0, 3.0]),
        })
        .unwrap();

        let input = Array3::<f32>::ones((2, 3, 2));
        let output = pre.transform(input.view()).unwrap();

        assert_eq!(output.dim(), (2, 3, 2));
        assert!(output.index_axis(ndarray::Axis(2), 0).iter().all(|&v| v == 2.0));
        assert!(output.index_axis(ndarray::Axis(2), 1).iter().all(|&v| v == 3.0));
    }

    #[test]
    fn test_no_weights_is_plain_standardization() {
        let pre = Preprocessor::new(ScalerStats {
            mean: vec![1.0],
            scale: vec![4.0],
            weights: None,
        })
        .unwrap();

        let output = pre.transform(array![[[9.0f32]]].view()).unwrap();
        assert_eq!(output[[0, 0, 0]], 2.0);
        assert!(!pre.has_weights());
    }

    #[test]
    fn test_zero_scale_rejected() {
        let err = Preprocessor::new(ScalerStats {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 0.0],
            weights: None,
        })
        .unwrap_err();

        assert!(matches!(err, PreprocessError::DegenerateScale { feature: 1, .. }));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Preprocessor::new(ScalerStats {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
            weights: Some(vec![1.0]),
        })
        .unwrap_err();

        assert!(matches!(err, PreprocessError::LengthMismatch { field: "weights", .. }));
    }

    #[test]
    fn test_wrong_feature_axis_rejected() {
        let input = Array3::<f32>::zeros((1, 3, 5));
        let err = preprocessor().transform(input.view()).unwrap_err();
        assert!(matches!(err, PreprocessError::ShapeMismatch { expected: 2, actual: 5 }));
    }

    #[test]
    fn test_stats_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"mean":[1.0,2.0],"scale":[0.5,0.25]}"#).unwrap();

        let stats = ScalerStats::load(&path).unwrap();
        assert_eq!(stats.mean, vec![1.0, 2.0]);
        assert!(stats.weights.is_none());
        assert!(Preprocessor::new(stats).is_ok());
    }
}
