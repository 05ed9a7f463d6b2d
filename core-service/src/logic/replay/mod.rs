//! Replay Module - historical telemetry → live message stream
//!
//! Reads exported telemetry rows, renames and casts them, drops
//! consecutive duplicate timestamps and pushes one message at a time
//! into a sink at a fixed pace.

pub mod dedup;
pub mod mapping;
pub mod message;
pub mod runner;
pub mod sink;
pub mod source;


use thiserror::Error;

// Re-export common types
pub use dedup::ConsecutiveDedup;
pub use mapping::{CastRow, ColumnMapping, MappedColumn};
pub use message::TelemetryMessage;
pub use runner::{ReplayConfig, ReplayHandle, ReplayIngestor, ReplayStats, RowErrorPolicy};
pub use sink::{ChannelSink, EngineSink, HttpSink, LogSink, SendError, TelemetrySink};
pub use source::{CsvSource, RawRow, SourceError, TabularSource, VecSource};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("source column '{column}' not found")]
    UnknownColumn { column: String },

    #[error("cannot cast '{value}' for feature {feature}")]
    Cast { feature: String, value: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl ReplayError {
    /// Row-level problems; the run may continue past these
    pub fn is_row_error(&self) -> bool {
        matches!(self, ReplayError::UnknownColumn { .. } | ReplayError::Cast { .. })
    }
}
