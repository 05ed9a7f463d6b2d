//! Tabular sources
//!
//! Rows are header-keyed string maps, yielded in file order.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// One raw row: column header → cell text
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub trait TabularSource {
    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<RawRow, SourceError>> + Send + '_>;
}

// ============================================================================
// CSV
// ============================================================================

/// CSV export with a header line
pub struct CsvSource<R = File> {
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        log::info!("Opening telemetry export: {}", path.display());
        Ok(Self {
            reader: csv::ReaderBuilder::new().has_headers(true).from_path(path)?,
        })
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: csv::ReaderBuilder::new().has_headers(true).from_reader(reader),
        }
    }
}

impl<R: Read + Send> TabularSource for CsvSource<R> {
    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<RawRow, SourceError>> + Send + '_> {
        let headers = match self.reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => return Box::new(std::iter::once(Err(e.into()))),
        };

        Box::new(self.reader.records().map(move |record| {
            let record = record?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect())
        }))
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Rows held in memory; every call to `rows` replays them from the start
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    rows: Vec<RawRow>,
}

impl VecSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Build rows from a header line and positional cells
    pub fn from_table(headers: &[&str], cells: &[&[&str]]) -> Self {
        let rows = cells
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (h.to_string(), v.to_string()))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TabularSource for VecSource {
    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<RawRow, SourceError>> + Send + '_> {
        Box::new(self.rows.iter().cloned().map(Ok))
    }
}
