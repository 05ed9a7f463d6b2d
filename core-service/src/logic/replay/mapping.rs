//! Column mapping - raw export headers → canonical feature names
//!
//! Export headers are long and unstable ("FH.6000.[ENS] ..."); messages
//! carry the short canonical names the schemas use.

use crate::logic::features::catalog::{SOURCE_TIMESTAMP_COLUMN, V1_SIGNALS};
use crate::logic::features::{FeatureKind, FeatureValue};

use super::source::RawRow;
use super::ReplayError;

/// One renamed, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct MappedColumn {
    pub source: String,
    pub name: String,
    pub kind: FeatureKind,
}

impl MappedColumn {
    pub fn new(source: impl Into<String>, name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            kind,
        }
    }
}

/// A row after renaming and casting, still in mapping order
#[derive(Debug, Clone, PartialEq)]
pub struct CastRow {
    pub timestamp: String,
    pub values: Vec<(String, FeatureValue)>,
}

#[derive(Debug, Clone)]
pub struct ColumnMapping {
    timestamp_column: String,
    columns: Vec<MappedColumn>,
}

impl ColumnMapping {
    pub fn new(timestamp_column: impl Into<String>, columns: Vec<MappedColumn>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            columns,
        }
    }

    /// Mapping for first-generation vehicle exports
    pub fn v1() -> Self {
        Self::new(
            SOURCE_TIMESTAMP_COLUMN,
            V1_SIGNALS
                .iter()
                .map(|s| MappedColumn::new(s.source, s.name, s.kind))
                .collect(),
        )
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn columns(&self) -> &[MappedColumn] {
        &self.columns
    }

    /// Rename and cast one row. Columns not in the mapping are dropped.
    pub fn project(&self, row: &RawRow) -> Result<CastRow, ReplayError> {
        let timestamp = lookup(row, &self.timestamp_column)?.to_string();

        let values = self
            .columns
            .iter()
            .map(|column| {
                let raw = lookup(row, &column.source)?;
                let value = column.kind.cast(raw).ok_or_else(|| ReplayError::Cast {
                    feature: column.name.clone(),
                    value: raw.to_string(),
                })?;
                Ok((column.name.clone(), value))
            })
            .collect::<Result<Vec<_>, ReplayError>>()?;

        Ok(CastRow { timestamp, values })
    }
}

fn lookup<'r>(row: &'r RawRow, column: &str) -> Result<&'r str, ReplayError> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| ReplayError::UnknownColumn {
            column: column.to_string(),
        })
}
