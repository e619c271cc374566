pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/analyze/resume",
            post(handlers::handle_screen_resume).layer(upload_limit),
        )
        .route("/api/analyze/job", post(handlers::handle_analyze_job))
        .with_state(state)
}
