//! Scoring request/response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use agv_health_core::{BufferStatus, Score};

/// Response header telling a genuine score from the degraded zero
pub const SCORE_STATUS_HEADER: &str = "x-score-status";

/// Top-level request field holding the record list
pub const RECORD_FIELD: &str = "record";

/// Record field carrying a JSON-encoded `[H, F]` window
pub const PAYLOAD_FIELD: &str = "data";

/// `{"record": [{"<feature>": value, ...}]}` for single-step models.
///
/// Windowed models read `{"record": [{"data": "[[...], ...]"}]}` leniently
/// from the raw body instead, so a malformed request degrades to zero.
#[derive(Debug, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(length(min = 1, message = "record must contain at least one entry"))]
    pub record: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub agv_id: String,
    pub ts: String,
    /// `None` while the vehicle's window is filling
    pub score: Option<Score>,
    pub buffer: Option<BufferStatus>,
}
