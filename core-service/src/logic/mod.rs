//! Logic Module - Inference & Ingestion Engines
//!
//! - `features/` - Feature schema and record validation
//! - `model/` - Windowing, preprocessing, model invocation
//! - `replay/` - Historical telemetry replay

pub mod features;
pub mod model;
pub mod replay;
