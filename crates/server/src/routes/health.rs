use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub device: String,
    pub whisper_model: String,
    pub dialect_model: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        device: state.engine.device().to_string(),
        whisper_model: state.engine.config().whisper_model.clone(),
        dialect_model: state.engine.config().dialect_model.clone(),
    })
}
