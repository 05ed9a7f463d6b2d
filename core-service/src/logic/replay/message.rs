//! Outbound telemetry message
//!
//! Flat JSON object: envelope fields first, then features in mapping order.
//! `{"agv_id": "AGV_1", "agv_type": "v1", "ts": "...", "<feature>": value, ...}`

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::logic::features::catalog::TIMESTAMP_FIELD;
use crate::logic::features::{FeatureValue, TelemetryRecord};

use super::mapping::CastRow;

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryMessage {
    pub agv_id: String,
    pub agv_type: String,
    pub ts: String,
    pub values: Vec<(String, FeatureValue)>,
}

impl TelemetryMessage {
    pub fn new(agv_id: impl Into<String>, agv_type: impl Into<String>, row: CastRow) -> Self {
        Self {
            agv_id: agv_id.into(),
            agv_type: agv_type.into(),
            ts: row.timestamp,
            values: row.values,
        }
    }

    /// Feature part of the message as an engine input
    pub fn to_record(&self) -> TelemetryRecord {
        TelemetryRecord::from_pairs(self.ts.clone(), self.values.iter().cloned())
    }
}

impl Serialize for TelemetryMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.values.len()))?;
        map.serialize_entry("agv_id", &self.agv_id)?;
        map.serialize_entry("agv_type", &self.agv_type)?;
        map.serialize_entry(TIMESTAMP_FIELD, &self.ts)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
