//! Scoring handlers
//!
//! Engine calls are CPU-bound and may block on a vehicle's window lock,
//! so they run on the blocking pool.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use validator::Validate;

use agv_health_core::logic::features::catalog::TIMESTAMP_FIELD;
use agv_health_core::{InferenceEngine, Score, SchemaError, TelemetryRecord};

use crate::models::{
    ScoreRequest, StepResponse, PAYLOAD_FIELD, RECORD_FIELD, SCORE_STATUS_HEADER,
};
use crate::{AppError, AppResult, AppState};

/// Stateless scoring: one value per request record
pub async fn score(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    let engine = state.engine(&name)?;

    let scores = tokio::task::spawn_blocking(move || score_batch(&engine, body)).await??;

    let degraded = scores.iter().filter(|s| s.is_degraded()).count();
    if degraded > 0 {
        tracing::warn!(model = %name, degraded, total = scores.len(), "Returning degraded scores");
    }

    let values: Vec<f32> = scores.iter().map(Score::value).collect();
    let status = if degraded > 0 { "degraded" } else { "ok" };

    Ok(([(SCORE_STATUS_HEADER, status)], Json(values)).into_response())
}

fn score_batch(engine: &InferenceEngine, body: Value) -> AppResult<Vec<Score>> {
    if engine.history() > 1 {
        return Ok(score_windows(engine, &body));
    }

    let req: ScoreRequest =
        serde_json::from_value(body).map_err(|e| AppError::ValidationError(e.to_string()))?;
    req.validate()?;

    req.record
        .iter()
        .map(|record| match record.get(PAYLOAD_FIELD) {
            Some(data) => Ok(score_payload(engine, data)),
            None => {
                let record = TelemetryRecord::from_json_map(record, TIMESTAMP_FIELD)?;
                Ok(engine.score_record(&record)?)
            }
        })
        .collect()
}

/// Windowed models never reject a request: anything without a decodable
/// `data` window degrades.
fn score_windows(engine: &InferenceEngine, body: &Value) -> Vec<Score> {
    let records = body
        .get(RECORD_FIELD)
        .and_then(Value::as_array)
        .filter(|records| !records.is_empty());

    let Some(records) = records else {
        return vec![engine.score_missing_payload()];
    };

    records
        .iter()
        .map(|record| match record.get(PAYLOAD_FIELD) {
            Some(data) => score_payload(engine, data),
            None => engine.score_missing_payload(),
        })
        .collect()
}

fn score_payload(engine: &InferenceEngine, data: &Value) -> Score {
    match data {
        Value::String(data) => engine.score_payload(data),
        other => engine.score_payload(&other.to_string()),
    }
}

/// Streaming scoring: push one telemetry message into the vehicle's window
pub async fn step(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut body): Json<Map<String, Value>>,
) -> AppResult<Json<StepResponse>> {
    let engine = state.engine(&name)?;

    let agv_id = match body.remove("agv_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        _ => return Err(AppError::ValidationError("agv_id is required".to_string())),
    };
    body.remove("agv_type");

    let record = TelemetryRecord::from_json_map(&body, TIMESTAMP_FIELD)?;
    let ts = record.timestamp().to_string();

    let entity = agv_id.clone();
    let (score, buffer) = tokio::task::spawn_blocking(move || {
        let score = engine.step(&entity, &record)?;
        Ok::<_, SchemaError>((score, engine.buffer_status(&entity)))
    })
    .await??;

    if let Some(score) = score {
        tracing::debug!(model = %name, agv = %agv_id, %ts, ?score, "Scored window");
    }

    Ok(Json(StepResponse {
        agv_id,
        ts,
        score,
        buffer,
    }))
}

/// Drop a vehicle's window
pub async fn end_session(
    State(state): State<AppState>,
    Path((name, agv_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let engine = state.engine(&name)?;

    if engine.end_session(&agv_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No session for '{}'", agv_id)))
    }
}
