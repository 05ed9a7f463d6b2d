//! Model listing handlers

use axum::{extract::{Path, State}, Json};

use crate::models::ModelInfo;
use crate::{AppResult, AppState};

/// List loaded models
pub async fn list(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    let mut models: Vec<ModelInfo> = state
        .engines
        .values()
        .map(|engine| ModelInfo::from_engine(engine))
        .collect();
    models.sort_by(|a, b| a.name.cmp(&b.name));
    Json(models)
}

/// Get single model
pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ModelInfo>> {
    let engine = state.engine(&name)?;
    Ok(Json(ModelInfo::from_engine(&engine)))
}
