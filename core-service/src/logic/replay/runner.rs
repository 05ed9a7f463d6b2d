//! Replay runner
//!
//! One row at a time, in source order: project → dedup → wait → send.
//! At most one send is outstanding; a stop request is honoured between
//! rows and during the wait.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::constants;

use super::dedup::ConsecutiveDedup;
use super::mapping::ColumnMapping;
use super::message::TelemetryMessage;
use super::sink::TelemetrySink;
use super::source::TabularSource;
use super::ReplayError;

/// What to do with a row that cannot be projected or cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// Log, count as rejected, move on
    #[default]
    Skip,
    /// End the run with the row's error
    Abort,
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub agv_id: String,
    pub agv_type: String,
    /// Delay before each send
    pub interval: Duration,
    pub on_row_error: RowErrorPolicy,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            agv_id: constants::DEFAULT_AGV_ID.to_string(),
            agv_type: constants::DEFAULT_AGV_TYPE.to_string(),
            interval: Duration::from_millis(constants::DEFAULT_REPLAY_INTERVAL_MS),
            on_row_error: RowErrorPolicy::Skip,
        }
    }
}

impl ReplayConfig {
    pub fn from_env() -> Self {
        Self {
            agv_id: constants::get_agv_id(),
            agv_type: constants::get_agv_type(),
            interval: Duration::from_millis(constants::get_replay_interval_ms()),
            on_row_error: if constants::is_replay_strict() {
                RowErrorPolicy::Abort
            } else {
                RowErrorPolicy::Skip
            },
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub rows_read: u64,
    pub sent: u64,
    pub duplicates_skipped: u64,
    pub rejected: u64,
    pub stopped: bool,
}

/// Cloneable stop switch for a running replay
#[derive(Debug, Clone)]
pub struct ReplayHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl ReplayHandle {
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }
}

pub struct ReplayIngestor {
    mapping: ColumnMapping,
    config: ReplayConfig,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

impl ReplayIngestor {
    pub fn new(mapping: ColumnMapping, config: ReplayConfig) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            mapping,
            config,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Once stopped, an ingestor stays stopped
    pub fn handle(&self) -> ReplayHandle {
        ReplayHandle {
            stop: Arc::clone(&self.stop_tx),
        }
    }

    /// Replay every row of `source` into `sink`.
    ///
    /// Source read errors and send failures end the run. Row errors follow
    /// `config.on_row_error`.
    pub async fn run<S, K>(&mut self, source: &mut S, sink: &K) -> Result<ReplayStats, ReplayError>
    where
        S: TabularSource + Send + ?Sized,
        K: TelemetrySink + ?Sized,
    {
        let run_id = Uuid::new_v4();
        log::info!(
            "Replay {} started: agv={} type={} interval={:?} policy={:?}",
            run_id,
            self.config.agv_id,
            self.config.agv_type,
            self.config.interval,
            self.config.on_row_error
        );

        let mut stats = ReplayStats::default();
        let mut dedup = ConsecutiveDedup::new();

        for row in source.rows() {
            if self.is_stopped() {
                stats.stopped = true;
                break;
            }

            let row = row?;
            stats.rows_read += 1;

            let cast = match self.mapping.project(&row) {
                Ok(cast) => cast,
                Err(e) if self.config.on_row_error == RowErrorPolicy::Skip => {
                    log::warn!("Replay {} row {} rejected: {}", run_id, stats.rows_read, e);
                    stats.rejected += 1;
                    continue;
                }
                Err(e) => {
                    log::error!("Replay {} aborted at row {}: {}", run_id, stats.rows_read, e);
                    return Err(e);
                }
            };

            if dedup.is_duplicate(&cast.timestamp) {
                log::info!("Skipped duplicate record ({})", cast.timestamp);
                stats.duplicates_skipped += 1;
                continue;
            }

            if !self.pace().await {
                stats.stopped = true;
                break;
            }

            let message =
                TelemetryMessage::new(self.config.agv_id.as_str(), self.config.agv_type.as_str(), cast);
            sink.send(&message).await?;
            dedup.mark_emitted(message.ts.as_str());
            stats.sent += 1;
            log::debug!("Message sent: {} @ {}", message.agv_id, message.ts);
        }

        log::info!(
            "Replay {} finished: read={} sent={} duplicates={} rejected={}{}",
            run_id,
            stats.rows_read,
            stats.sent,
            stats.duplicates_skipped,
            stats.rejected,
            if stats.stopped { " (stopped)" } else { "" }
        );

        Ok(stats)
    }

    fn is_stopped(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Inter-record delay. `false` when a stop arrived first.
    async fn pace(&mut self) -> bool {
        if self.config.interval.is_zero() {
            return !self.is_stopped();
        }

        tokio::select! {
            _ = tokio::time::sleep(self.config.interval) => true,
            _ = self.stop_rx.wait_for(|stopped| *stopped) => false,
        }
    }
}
