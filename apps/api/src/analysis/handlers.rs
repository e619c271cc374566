//! Axum route handlers for the analysis API.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::analysis::upload::{is_too_large, too_large, StagedUpload};
use crate::analysis::validation::{validate_job_role, JdAnalysisRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze/resume
///
/// Multipart body with `file` (PDF) and `jobRole`. Returns the NLP payload unchanged.
pub async fn handle_screen_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("screen_resume", %request_id);

    async move {
        let mut multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;
        let max_bytes = state.config.max_upload_bytes;

        let mut upload: Option<StagedUpload> = None;
        let mut job_role: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| {
                if is_too_large(&e) {
                    too_large(max_bytes)
                } else {
                    AppError::validation(format!("Malformed multipart body: {e}"))
                }
            })?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("file") if upload.is_none() => {
                    let dir = state.analysis.upload_dir();
                    upload = Some(StagedUpload::from_field(field, dir, max_bytes).await?);
                }
                Some("jobRole") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::invalid_field("jobRole", e.to_string()))?;
                    job_role = Some(text);
                }
                _ => {} // unknown parts are drained and ignored
            }
        }

        let upload = match upload {
            Some(upload) if !upload.is_empty() => upload,
            Some(_) => return Err(AppError::invalid_field("file", "Uploaded file is empty")),
            None => return Err(AppError::invalid_field("file", "No file uploaded")),
        };
        let job_role = validate_job_role(job_role.as_deref())?;

        let payload = state.analysis.screen_resume(upload, job_role).await?;
        Ok::<_, AppError>(Json(payload))
    }
    .instrument(span)
    .await
}

/// POST /api/analyze/job
///
/// JSON body `{description, topN?, threshold?}`. Returns the NLP payload unchanged.
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze_job", %request_id);

    async move {
        let Json(body) = body.map_err(|e| AppError::validation(e.body_text()))?;
        let request = JdAnalysisRequest::parse(&body)?;

        let payload = state.analysis.analyze_job(request).await?;
        Ok::<_, AppError>(Json(payload))
    }
    .instrument(span)
    .await
}
