//! Telemetry Record - one timestep of named feature values
//!
//! Records are schema-agnostic. `FeatureSchema::validate` decides whether a
//! record fits a model.

use std::collections::HashMap;

use serde::Serialize;

use super::layout::SchemaError;
use super::value::FeatureValue;

/// One timestep of telemetry from one vehicle. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    timestamp: String,
    values: HashMap<String, FeatureValue>,
}

impl TelemetryRecord {
    pub fn new(timestamp: impl Into<String>, values: HashMap<String, FeatureValue>) -> Self {
        Self {
            timestamp: timestamp.into(),
            values,
        }
    }

    pub fn from_pairs<K, I>(timestamp: impl Into<String>, pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FeatureValue)>,
    {
        Self::new(
            timestamp,
            pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )
    }

    /// Build from a decoded JSON object.
    ///
    /// The field named `timestamp_field` becomes the timestamp (stringified
    /// if not a string); when absent the current UTC time is used.
    pub fn from_json_map(
        map: &serde_json::Map<String, serde_json::Value>,
        timestamp_field: &str,
    ) -> Result<Self, SchemaError> {
        let timestamp = match map.get(timestamp_field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => chrono::Utc::now().to_rfc3339(),
        };

        let values = map
            .iter()
            .filter(|(k, _)| k.as_str() != timestamp_field)
            .map(|(k, v)| {
                FeatureValue::from_json(v)
                    .map(|value| (k.clone(), value))
                    .ok_or_else(|| SchemaError::UnsupportedValue { field: k.clone() })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self { timestamp, values })
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &HashMap<String, FeatureValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
