use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Reports which log store backs the running instance. Does not touch the NLP service.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let log_store = if state.config.database_url.is_some() {
        "postgres"
    } else {
        "memory"
    };
    Json(json!({
        "status": "ok",
        "logStore": log_store,
        "maxUploadBytes": state.config.max_upload_bytes,
    }))
}
