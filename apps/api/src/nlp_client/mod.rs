//! NLP client: the single point of entry for calls to the external NLP service.
//!
//! The service exposes two endpoints:
//! - `POST {base}/analyze/resume` (multipart: `file`, `job_role`)
//! - `POST {base}/analyze/jd` (JSON: `description`, `topN`, `threshold`)
//!
//! Both return JSON that is passed through to callers untouched. Exactly one
//! attempt is made per call; there is no retry loop.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::analysis::upload::StagedUpload;
use crate::analysis::validation::JdAnalysisRequest;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("NLP service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("NLP service did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("NLP service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("NLP service returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read staged upload: {0}")]
    Upload(#[from] std::io::Error),
}

/// The two scoring capabilities of the NLP service.
///
/// Carried in `AnalysisService` as `Arc<dyn NlpService>` so tests can swap in a stub.
#[async_trait]
pub trait NlpService: Send + Sync {
    async fn analyze_resume(
        &self,
        upload: &StagedUpload,
        job_role: &str,
    ) -> Result<Value, NlpError>;

    async fn analyze_jd(&self, request: &JdAnalysisRequest) -> Result<Value, NlpError>;
}

/// Error bodies produced by the NLP service look like `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct NlpErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// HTTP-backed `NlpService`.
#[derive(Clone)]
pub struct HttpNlpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpNlpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NlpError> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn transport_error(&self, err: reqwest::Error) -> NlpError {
        if err.is_timeout() {
            NlpError::Timeout(self.timeout)
        } else {
            NlpError::Transport(err)
        }
    }

    /// Maps a response to its JSON payload, or to an `NlpError` carrying the
    /// upstream error text when the status is not a success.
    async fn read_json(&self, response: Response) -> Result<Value, NlpError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(e))?;
            return Err(NlpError::Status {
                status: status.as_u16(),
                message: upstream_message(&body, status.canonical_reason()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body).map_err(|e| NlpError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl NlpService for HttpNlpClient {
    async fn analyze_resume(
        &self,
        upload: &StagedUpload,
        job_role: &str,
    ) -> Result<Value, NlpError> {
        let file = tokio::fs::File::open(upload.path()).await?;
        debug!(
            "Streaming résumé '{}' ({} bytes) to NLP service",
            upload.file_name(),
            upload.size()
        );

        let part = Part::stream_with_length(Body::from(file), upload.size())
            .file_name(upload.file_name().to_string())
            .mime_str(upload.content_type())?;
        let form = Form::new()
            .part("file", part)
            .text("job_role", job_role.to_string());

        let response = self
            .client
            .post(self.endpoint("analyze/resume"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(response).await
    }

    async fn analyze_jd(&self, request: &JdAnalysisRequest) -> Result<Value, NlpError> {
        let response = self
            .client
            .post(self.endpoint("analyze/jd"))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(response).await
    }
}

/// Picks the most useful error text out of an upstream error body.
fn upstream_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<NlpErrorBody>(body) {
        return parsed.error;
    }
    let body = body.trim();
    if body.is_empty() {
        reason.unwrap_or("no response body").to_string()
    } else {
        body.to_string()
    }
}
