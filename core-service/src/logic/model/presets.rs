//! Built-in Model Presets
//!
//! Manifests for the two production models, so a bare artifact directory
//! (just the `.onnx` files) is enough to serve them. A `<name>.json`
//! manifest in the model directory always takes precedence.

use crate::logic::features::catalog::{V1_LAYOUT_VERSION, V1_SIGNALS, WHEEL_SIGNALS};
use crate::logic::features::FeatureSpec;

use super::manifest::{ModelManifest, OutputSpec, ScalerSource};
use super::preprocess::ScalerStats;

/// Power-consumption forecaster (MPC-200, trained on October 2022 data)
pub const POWER_MODEL: &str = "mpc_200";

/// Wheel-problem classifier (trained on July/August 2023 data)
pub const WHEEL_MODEL: &str = "wheel_problems";

/// Window length of the power model
pub const POWER_HISTORY: usize = 50;

/// Target statistics of the power model (momentary power consumption)
pub const POWER_TARGET_MEAN: f64 = 331.105838;
pub const POWER_TARGET_SCALE: f64 = 73.6188028;

pub fn preset(name: &str) -> Option<ModelManifest> {
    match name {
        POWER_MODEL => Some(power_manifest()),
        WHEEL_MODEL => Some(wheel_manifest()),
        _ => None,
    }
}

pub fn power_manifest() -> ModelManifest {
    ModelManifest {
        name: POWER_MODEL.to_string(),
        model_file: "mpc_200_model.onnx".to_string(),
        history: POWER_HISTORY,
        layout_version: V1_LAYOUT_VERSION,
        features: V1_SIGNALS
            .iter()
            .map(|s| FeatureSpec::new(s.name, s.kind))
            .collect(),
        scaler: ScalerSource::Inline(ScalerStats {
            mean: POWER_MEAN.to_vec(),
            scale: POWER_SCALE.to_vec(),
            weights: Some(POWER_WEIGHTS.to_vec()),
        }),
        output: OutputSpec::Regression {
            mean: POWER_TARGET_MEAN,
            scale: POWER_TARGET_SCALE,
        },
    }
}

/// Scaler stats ship as a separate file exported with the forest
pub fn wheel_manifest() -> ModelManifest {
    ModelManifest {
        name: WHEEL_MODEL.to_string(),
        model_file: "wheel_problems.onnx".to_string(),
        history: 1,
        layout_version: V1_LAYOUT_VERSION,
        features: WHEEL_SIGNALS
            .iter()
            .map(|(name, kind)| FeatureSpec::new(*name, *kind))
            .collect(),
        scaler: ScalerSource::File {
            file: "wheel_problems.scaler.json".to_string(),
        },
        output: OutputSpec::Classification,
    }
}

// ============================================================================
// TRAINING STATISTICS (power model, feature order = V1_SIGNALS)
// ============================================================================

#[allow(clippy::excessive_precision)]
const POWER_MEAN: [f32; 56] = [
    331.105838, 46555.8587, 0.986886105, 0.999959712,
    4.02884654e-05, 0.812396761, 0.812396761, 0.812396761,
    -1.11133717, 0.999979856, 0.999979856, 0.986886105,
    0.999979856, 4.02884654e-05, 0.999979856, -1.04385399,
    4.02884654e-05, 0.999959712, 0.0180290883, 0.0463720237,
    0.139236936, 0.0588413037, 0.129607993, 0.0492123605,
    0.565992506, 0.647334918, 11.0134161, 2.42615124,
    0.144857177, 2.42615124, 2.42615124, 0.144857177,
    2.42615124, 0.999939567, 2.01442327e-05, 2.97353048,
    35.9695176, 21.5484972, 0.310005953, 94.9589058,
    -0.00149215925, 2.42615124, 0.144857177, 35.8947867,
    552.66482, -21.6881673, 1313.13718, 1411.544,
    0.986886105, 4.02884654e-05, 0.998025865, 0.992123605,
    0.995850288, 0.973006728, 0.969300189, 1.0003626,
];

#[allow(clippy::excessive_precision)]
const POWER_SCALE: [f32; 56] = [
    73.6188028, 1765.34683, 0.113762565, 0.00634719168,
    0.00634719168, 0.39039501, 0.39039501, 0.39039501,
    158.810218, 0.00448818749, 0.00448818749, 0.113762565,
    0.00448818749, 0.00634719168, 0.00448818749, 170.070154,
    0.00634719168, 0.00634719168, 0.13305653, 0.210289465,
    0.346193605, 0.235327441, 0.335871644, 0.216311128,
    0.495625856, 0.477799563, 46.7716683, 1.13597312,
    0.351956781, 1.13597312, 1.13597312, 0.351956781,
    1.13597312, 0.00777361216, 0.00448818749, 0.899095282,
    6.7238988, 3.93929876, 1.72140102, 4.32073508,
    0.209424149, 1.13597312, 0.351956781, 20.2493508,
    18304.514, 18025.5817, 725.428908, 782.406606,
    0.113762565, 0.00634719168, 0.0443873585, 0.088398854,
    0.0642844602, 0.162063676, 0.172503137, 0.0571247251,
];

#[allow(clippy::excessive_precision)]
const POWER_WEIGHTS: [f32; 56] = [
    0.94434573, 1.05775119, 0.98145535, 0.88252097,
    1.59831661, 0.20711831, 1.82091174, 0.62167594,
    0.70944001, 1.56842617, 0.92145948, 0.80771739,
    0.21285017, -1.75739862, 2.88456252, 0.21929224,
    -0.46961886, 0.82098079, 1.27824626, 0.30006528,
    0.23129348, 0.67005413, 0.51058337, 0.77160606,
    -1.43119529, 0.93059645, 1.49700404, 0.80177857,
    0.50795383, 0.97205259, 1.97306834, 0.90645151,
    1.14622803, 0.92498906, 0.580554, 0.62725778,
    1.10432259, 0.0972941, 0.02687283, 0.56381115,
    -1.19465716, 0.56049716, 0.19689367, 0.79387506,
    -1.77186096, 0.10502172, 0.08165884, 0.26459102,
    0.22519161, 0.81502814, 0.13262141, 1.001232,
    0.83051719, 1.84447032, 0.36032435, 0.43090188,
];
