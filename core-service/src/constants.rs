//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment at startup.

use std::path::PathBuf;

/// Environment variable holding the model artifact base directory
pub const MODEL_DIR_ENV: &str = "MODEL_DIR";

/// Default inter-record delay for replays (milliseconds)
pub const DEFAULT_REPLAY_INTERVAL_MS: u64 = 1000;

/// Default vehicle identity stamped on replayed messages
pub const DEFAULT_AGV_ID: &str = "AGV_1";

/// Default vehicle generation stamped on replayed messages
pub const DEFAULT_AGV_TYPE: &str = "v1";

/// Default HTTP sink timeout (seconds)
pub const DEFAULT_SINK_TIMEOUT_SECS: u64 = 30;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AGV Health";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model directory from environment or use the local data dir
pub fn get_model_dir() -> PathBuf {
    std::env::var(MODEL_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_model_dir())
}

/// Fallback model directory when `MODEL_DIR` is unset
pub fn default_model_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agv-health")
        .join("models")
}

/// Get replay interval from environment or use default
pub fn get_replay_interval_ms() -> u64 {
    std::env::var("REPLAY_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REPLAY_INTERVAL_MS)
}

/// Get vehicle id from environment or use default
pub fn get_agv_id() -> String {
    std::env::var("AGV_ID").unwrap_or_else(|_| DEFAULT_AGV_ID.to_string())
}

/// Get vehicle type from environment or use default
pub fn get_agv_type() -> String {
    std::env::var("AGV_TYPE").unwrap_or_else(|_| DEFAULT_AGV_TYPE.to_string())
}

/// Get telemetry sink URL, if one is configured
pub fn get_sink_url() -> Option<String> {
    std::env::var("TELEMETRY_SINK_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Check if replay should stop on the first bad row instead of skipping it
pub fn is_replay_strict() -> bool {
    std::env::var("REPLAY_STRICT")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
