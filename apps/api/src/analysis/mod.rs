//! Analysis proxy: validates, forwards to the NLP service, records a log row.
//!
//! Per request: `Received → Validating → {Rejected | Forwarding} →
//! {LoggedSuccess | UpstreamFailed | StorageFailed}`. One upstream attempt, no retries.
//! A log row is written only after the upstream call succeeded, and the payload
//! is returned only after the log row is durable.

pub mod handlers;
pub mod models;
pub mod upload;
pub mod validation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::analysis::models::log_score;
use crate::analysis::upload::StagedUpload;
use crate::analysis::validation::JdAnalysisRequest;
use crate::errors::AppError;
use crate::log_store::{LogStore, NewAnalysisLog};
use crate::nlp_client::NlpService;

#[derive(Clone)]
pub struct AnalysisService {
    nlp: Arc<dyn NlpService>,
    logs: Arc<dyn LogStore>,
    upload_dir: PathBuf,
}

impl AnalysisService {
    pub fn new(nlp: Arc<dyn NlpService>, logs: Arc<dyn LogStore>, upload_dir: PathBuf) -> Self {
        Self {
            nlp,
            logs,
            upload_dir,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Screens a staged résumé against `job_role`.
    ///
    /// Takes ownership of the upload: the staged file is gone when this returns.
    pub async fn screen_resume(
        &self,
        upload: StagedUpload,
        job_role: String,
    ) -> Result<Value, AppError> {
        info!(
            "Forwarding résumé '{}' ({} bytes) for role '{job_role}'",
            upload.file_name(),
            upload.size()
        );

        let payload = self
            .nlp
            .analyze_resume(&upload, &job_role)
            .await
            .map_err(|e| {
                error!("Résumé analysis failed: {e}");
                e
            })?;
        drop(upload);

        let score = log_score(&payload);
        let stored = self
            .logs
            .append(NewAnalysisLog::resume(job_role, score, payload.clone()))
            .await?;

        info!("Résumé analysis logged as {} (score {:?})", stored.id, score);
        Ok(payload)
    }

    /// Extracts scored skills from a validated job description.
    pub async fn analyze_job(&self, request: JdAnalysisRequest) -> Result<Value, AppError> {
        info!(
            "Forwarding job description ({} chars, topN={}, threshold={})",
            request.description.chars().count(),
            request.top_n,
            request.threshold
        );

        let payload = self
            .nlp
            .analyze_jd(&request)
            .await
            .map_err(|e| {
                error!("Job description analysis failed: {e}");
                e
            })?;

        let stored = self
            .logs
            .append(NewAnalysisLog::job(payload.clone()))
            .await?;

        info!("Job description analysis logged as {}", stored.id);
        Ok(payload)
    }
}
