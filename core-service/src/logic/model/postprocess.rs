//! Postprocessing - inverse output scaling
//!
//! Regression models are trained on a standardized target; their raw output
//! is mapped back into physical units here. Classifiers skip this step.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Postprocessor {
    pub mean: f64,
    pub scale: f64,
}

impl Postprocessor {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    /// `x * scale + mean`
    pub fn invert(&self, x: f32) -> f32 {
        (x as f64 * self.scale + self.mean) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::preprocess::{Preprocessor, ScalerStats};
    use ndarray::array;

    #[test]
    fn test_invert() {
        let post = Postprocessor::new(331.105838, 73.6188028);
        assert!((post.invert(0.0) - 331.105838).abs() < 1e-4);
        assert!((post.invert(1.0) - 404.7246408).abs() < 1e-3);
    }

    #[test]
    fn test_inverts_unweighted_standardization() {
        let (mean, scale) = (46555.8587f32, 1765.34683f32);
        let pre = Preprocessor::new(ScalerStats {
            mean: vec![mean],
            scale: vec![scale],
            weights: None,
        })
        .unwrap();
        let post = Postprocessor::new(mean as f64, scale as f64);

        for x in [44000.0f32, 46555.8587, 48123.25, 0.0] {
            let standardized = pre.transform(array![[[x]]].view()).unwrap()[[0, 0, 0]];
            let restored = post.invert(standardized);
            assert!(
                (restored - x).abs() <= x.abs().max(1.0) * 1e-5,
                "{} -> {} -> {}",
                x,
                standardized,
                restored
            );
        }
    }
}
