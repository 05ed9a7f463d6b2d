//! Loaded model description

use serde::Serialize;

use agv_health_core::logic::features::LayoutInfo;
use agv_health_core::{EngineStatus, InferenceEngine};

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub status: EngineStatus,
    pub layout: LayoutInfo,
}

impl ModelInfo {
    pub fn from_engine(engine: &InferenceEngine) -> Self {
        Self {
            name: engine.name().to_string(),
            status: engine.status(),
            layout: engine.schema().layout_info(),
        }
    }
}
