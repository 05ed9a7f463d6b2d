//! Features Module - Schema & Record Validation
//!
//! Turns loosely typed telemetry into fixed-order feature vectors.
//! Add a model → add its schema; the engine never sees names again.

pub mod catalog;
pub mod layout;
pub mod record;
pub mod value;

// Re-export common types
pub use layout::{FeatureSchema, FeatureSpec, LayoutInfo, SchemaError};
pub use record::TelemetryRecord;
pub use value::{FeatureKind, FeatureValue};
