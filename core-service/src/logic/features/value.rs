//! Typed Feature Values
//!
//! Raw telemetry arrives as strings (CSV exports, OPC UA dumps) or loosely
//! typed JSON. Everything is cast into `FeatureValue` at the boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The only token that casts to boolean 1. Case-sensitive, exact match.
///
/// Existing trained models were fit on data produced with this rule, so
/// `"True"`, `"1"` and `"TRUE"` all cast to 0.
pub const TRUE_TOKEN: &str = "true";

// ============================================================================
// FEATURE KIND
// ============================================================================

/// Declared type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Float,
    Integer,
    /// Boolean carried as integer 0/1
    Boolean,
    /// Identity string (timestamps); never fed to a model
    Text,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Float => "float",
            FeatureKind::Integer => "integer",
            FeatureKind::Boolean => "boolean",
            FeatureKind::Text => "text",
        }
    }

    /// Whether values of this kind can enter a model tensor
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FeatureKind::Text)
    }

    /// Cast a raw string into a typed value.
    ///
    /// Returns `None` when the string is not a valid float/integer.
    /// Boolean and text casts never fail.
    pub fn cast(&self, raw: &str) -> Option<FeatureValue> {
        match self {
            FeatureKind::Float => raw.trim().parse::<f64>().ok().map(FeatureValue::Float),
            FeatureKind::Integer => raw.trim().parse::<i64>().ok().map(FeatureValue::Integer),
            FeatureKind::Boolean => Some(FeatureValue::Integer(bool_token(raw))),
            FeatureKind::Text => Some(FeatureValue::Text(raw.to_string())),
        }
    }

    /// Coerce an already typed value into a model input for this kind
    pub fn coerce(&self, value: &FeatureValue) -> Option<f32> {
        match (self, value) {
            (FeatureKind::Text, _) => None,

            (FeatureKind::Float, FeatureValue::Float(x)) => Some(*x as f32),
            (FeatureKind::Float, FeatureValue::Integer(i)) => Some(*i as f32),
            (FeatureKind::Float, FeatureValue::Text(s)) => {
                s.trim().parse::<f64>().ok().map(|x| x as f32)
            }

            (FeatureKind::Integer, FeatureValue::Integer(i)) => Some(*i as f32),
            (FeatureKind::Integer, FeatureValue::Float(x)) => {
                (x.is_finite() && x.fract() == 0.0).then_some(*x as f32)
            }
            (FeatureKind::Integer, FeatureValue::Text(s)) => {
                s.trim().parse::<i64>().ok().map(|i| i as f32)
            }

            (FeatureKind::Boolean, FeatureValue::Integer(i)) => match i {
                0 | 1 => Some(*i as f32),
                _ => None,
            },
            (FeatureKind::Boolean, FeatureValue::Float(x)) => {
                (*x == 0.0 || *x == 1.0).then_some(*x as f32)
            }
            (FeatureKind::Boolean, FeatureValue::Text(s)) => Some(bool_token(s) as f32),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"true"` -> 1, anything else -> 0
pub fn bool_token(raw: &str) -> i64 {
    if raw == TRUE_TOKEN {
        1
    } else {
        0
    }
}

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// A typed telemetry scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    /// Convert a JSON scalar. Arrays, objects and null are rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(FeatureValue::Integer(*b as i64)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(FeatureValue::Integer)
                .or_else(|| n.as_f64().map(FeatureValue::Float)),
            serde_json::Value::String(s) => Some(FeatureValue::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(i) => write!(f, "{}", i),
            FeatureValue::Float(x) => write!(f, "{}", x),
            FeatureValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}
