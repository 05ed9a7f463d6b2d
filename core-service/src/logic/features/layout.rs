//! Feature Layout - Model Input Schema
//!
//! **CRITICAL: a schema fixes the column order a model was trained on**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → bump the schema version
//! 2. Change order → bump the schema version
//! 3. Remove feature → bump the schema version
//!
//! Every record entering inference goes through `FeatureSchema::validate`,
//! which produces a fixed-order `Vec<f32>`. Nothing downstream ever looks
//! at feature names again.

use std::collections::HashMap;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::TelemetryRecord;
use super::value::FeatureKind;

// ============================================================================
// ERRORS
// ============================================================================

/// Schema mismatch between a record (or layout) and a model schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema mismatch: feature '{feature}' missing from record")]
    MissingFeature { feature: String },

    #[error("schema mismatch: feature '{feature}' ({kind}) cannot take value {value}")]
    Uncoercible {
        feature: String,
        kind: FeatureKind,
        value: String,
    },

    #[error("schema mismatch: field '{field}' is not part of the schema")]
    UnexpectedFeature { field: String },

    #[error("schema mismatch: field '{field}' is not a scalar")]
    UnsupportedValue { field: String },

    #[error("duplicate feature '{0}' in schema")]
    DuplicateFeature(String),

    #[error("feature '{0}' is not numeric and cannot feed a model")]
    NonNumericFeature(String),

    #[error(
        "feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
         got v{actual_version} (hash: {actual_hash:08x})"
    )]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },
}

// ============================================================================
// FEATURE SPEC
// ============================================================================

/// One named, typed column of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered feature list a model expects
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    version: u8,
    features: Vec<FeatureSpec>,
    index: HashMap<String, usize>,
    hash: u32,
}

impl FeatureSchema {
    /// Build a schema. Names must be unique and every kind numeric.
    pub fn new(version: u8, features: Vec<FeatureSpec>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(features.len());

        for (i, spec) in features.iter().enumerate() {
            if !spec.kind.is_numeric() {
                return Err(SchemaError::NonNumericFeature(spec.name.clone()));
            }
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateFeature(spec.name.clone()));
            }
        }

        let hash = compute_layout_hash(version, &features);

        Ok(Self {
            version,
            features,
            index,
            hash,
        })
    }

    /// Number of features (F)
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Get feature index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get feature name by index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.features.get(index).map(|f| f.name.as_str())
    }

    /// CRC32 of version + ordered names + kinds
    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    /// Validate that a peer's layout matches this schema
    pub fn validate_layout(&self, version: u8, hash: u32) -> Result<(), SchemaError> {
        if version != self.version || hash != self.hash {
            return Err(SchemaError::LayoutMismatch {
                expected_version: self.version,
                expected_hash: self.hash,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo {
            version: self.version,
            hash: self.hash,
            feature_count: self.len(),
            feature_names: self.names().map(str::to_string).collect(),
        }
    }

    /// Project a record onto this schema, in schema order.
    ///
    /// The record must carry exactly the schema's features. Its timestamp is
    /// held apart and envelope fields must be stripped by the caller.
    pub fn validate(&self, record: &TelemetryRecord) -> Result<Vec<f32>, SchemaError> {
        let values = self
            .features
            .iter()
            .map(|spec| {
                let value = record.get(&spec.name).ok_or_else(|| SchemaError::MissingFeature {
                    feature: spec.name.clone(),
                })?;

                spec.kind
                    .coerce(value)
                    .ok_or_else(|| SchemaError::Uncoercible {
                        feature: spec.name.clone(),
                        kind: spec.kind,
                        value: value.to_string(),
                    })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        // Lowest extra name; map order is unspecified
        let extra = record
            .values()
            .keys()
            .filter(|name| !self.index.contains_key(name.as_str()))
            .min();
        if let Some(field) = extra {
            return Err(SchemaError::UnexpectedFeature {
                field: field.clone(),
            });
        }

        Ok(values)
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a feature layout
/// Used to detect layout mismatches between producers and models
fn compute_layout_hash(version: u8, features: &[FeatureSpec]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[version]);

    for spec in features {
        hasher.update(spec.name.as_bytes());
        hasher.update(&[0]); // Separator
        hasher.update(spec.kind.as_str().as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout summary for serialization/logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::value::FeatureValue;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            1,
            vec![
                FeatureSpec::new("battery_cell_voltage", FeatureKind::Float),
                FeatureSpec::new("go_to_result", FeatureKind::Integer),
                FeatureSpec::new("scanners_muted", FeatureKind::Boolean),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_validate_follows_schema_order() {
        let schema = schema();

        // Inserted in reverse order on purpose
        let record = TelemetryRecord::from_pairs(
            "2023-07-01T10:00:00Z",
            vec![
                ("scanners_muted", FeatureValue::Text("true".into())),
                ("go_to_result", FeatureValue::Integer(3)),
                ("battery_cell_voltage", FeatureValue::Float(46555.5)),
            ],
        );

        assert_eq!(schema.validate(&record).unwrap(), vec![46555.5, 3.0, 1.0]);
    }

    #[test]
    fn test_validate_missing_feature() {
        let record = TelemetryRecord::from_pairs(
            "t",
            vec![("battery_cell_voltage", FeatureValue::Float(1.0))],
        );

        assert_eq!(
            schema().validate(&record),
            Err(SchemaError::MissingFeature {
                feature: "go_to_result".into()
            })
        );
    }

    #[test]
    fn test_validate_uncoercible_value() {
        let record = TelemetryRecord::from_pairs(
            "t",
            vec![
                ("battery_cell_voltage", FeatureValue::Text("n/a".into())),
                ("go_to_result", FeatureValue::Integer(0)),
                ("scanners_muted", FeatureValue::Integer(0)),
            ],
        );

        let err = schema().validate(&record).unwrap_err();
        assert!(matches!(err, SchemaError::Uncoercible { ref feature, .. } if feature == "battery_cell_voltage"));
    }

    #[test]
    fn test_validate_rejects_extra_fields() {
        let record = TelemetryRecord::from_pairs(
            "t",
            vec![
                ("battery_cell_voltage", FeatureValue::Float(1.0)),
                ("go_to_result", FeatureValue::Integer(2)),
                ("scanners_muted", FeatureValue::Integer(0)),
                ("zz_bogus", FeatureValue::Float(2.0)),
                ("agv_id", FeatureValue::Text("AGV_1".into())),
            ],
        );

        assert_eq!(
            schema().validate(&record),
            Err(SchemaError::UnexpectedFeature {
                field: "agv_id".into()
            })
        );

        let single = FeatureSchema::new(1, vec![FeatureSpec::new("a", FeatureKind::Float)]).unwrap();
        let record = TelemetryRecord::from_pairs(
            "t",
            vec![("a", FeatureValue::Float(1.0)), ("bogus", FeatureValue::Float(2.0))],
        );
        assert!(matches!(
            single.validate(&record),
            Err(SchemaError::UnexpectedFeature { ref field }) if field == "bogus"
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_text() {
        let dup = FeatureSchema::new(
            1,
            vec![
                FeatureSpec::new("a", FeatureKind::Float),
                FeatureSpec::new("a", FeatureKind::Float),
            ],
        );
        assert_eq!(dup.unwrap_err(), SchemaError::DuplicateFeature("a".into()));

        let text = FeatureSchema::new(1, vec![FeatureSpec::new("ts", FeatureKind::Text)]);
        assert_eq!(text.unwrap_err(), SchemaError::NonNumericFeature("ts".into()));
    }

    #[test]
    fn test_layout_hash_tracks_order_and_version() {
        let a = schema();
        let reordered = FeatureSchema::new(
            1,
            vec![
                FeatureSpec::new("go_to_result", FeatureKind::Integer),
                FeatureSpec::new("battery_cell_voltage", FeatureKind::Float),
                FeatureSpec::new("scanners_muted", FeatureKind::Boolean),
            ],
        )
        .unwrap();
        let bumped = FeatureSchema::new(2, a.features().to_vec()).unwrap();

        assert_ne!(a.layout_hash(), 0);
        assert_eq!(a.layout_hash(), schema().layout_hash());
        assert_ne!(a.layout_hash(), reordered.layout_hash());
        assert_ne!(a.layout_hash(), bumped.layout_hash());

        assert!(a.validate_layout(1, a.layout_hash()).is_ok());
        assert!(a.validate_layout(2, a.layout_hash()).is_err());
        assert!(a.validate_layout(1, reordered.layout_hash()).is_err());
    }

    #[test]
    fn test_index_lookup() {
        let schema = schema();
        assert_eq!(schema.index_of("go_to_result"), Some(1));
        assert_eq!(schema.index_of("nonexistent"), None);
        assert_eq!(schema.name_at(2), Some("scanners_muted"));
        assert_eq!(schema.name_at(100), None);

        let info = schema.layout_info();
        assert_eq!(info.feature_count, 3);
        assert_eq!(info.feature_names[0], "battery_cell_voltage");
    }
}
