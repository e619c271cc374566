//! Typed client for the screening API.
//!
//! Requests are checked with the same field rules the server applies, so an
//! invalid job description never leaves the process. Every call ends in exactly
//! one outcome: the decoded result or a `ClientError`.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::models::{JdAnalysisResult, ResumeScreeningResult};
use crate::analysis::validation::{validate_job_role, FieldError, JdAnalysisRequest};

const GENERIC_FAILURE: &str = "Analysis request failed";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent.
    #[error("{}", .0.message)]
    Invalid(#[from] FieldError),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        field: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// The offending field, for validation failures raised on either side.
    pub fn field(&self) -> Option<&str> {
        match self {
            ClientError::Invalid(err) => Some(&err.field),
            ClientError::Api { field, .. } => field.as_deref(),
            ClientError::Transport(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    field: Option<String>,
}

/// Raw job-description form input. Numeric fields are kept as typed text and
/// coerced by the shared rules.
#[derive(Debug, Clone, Default)]
pub struct JdAnalysisForm {
    pub description: String,
    pub top_n: Option<String>,
    pub threshold: Option<String>,
}

impl JdAnalysisForm {
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        if let Some(top_n) = &self.top_n {
            body.insert("topN".to_string(), Value::String(top_n.clone()));
        }
        if let Some(threshold) = &self.threshold {
            body.insert("threshold".to_string(), Value::String(threshold.clone()));
        }
        Value::Object(body)
    }

    pub fn validate(&self) -> Result<JdAnalysisRequest, FieldError> {
        JdAnalysisRequest::parse(&self.to_json())
    }
}

#[derive(Clone)]
pub struct ScreeningClient {
    http: Client,
    base_url: String,
}

impl ScreeningClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST /api/analyze/resume
    pub async fn screen_resume(
        &self,
        file_name: &str,
        file: Vec<u8>,
        job_role: &str,
    ) -> Result<ResumeScreeningResult, ClientError> {
        if file.is_empty() {
            return Err(FieldError::new("file", "Please select a résumé PDF").into());
        }
        let job_role = validate_job_role(Some(job_role))?;

        let part = Part::bytes(file)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part).text("jobRole", job_role);

        let response = self
            .http
            .post(format!("{}/api/analyze/resume", self.base_url))
            .multipart(form)
            .send()
            .await?;

        decode(response).await
    }

    /// POST /api/analyze/job
    pub async fn analyze_job(
        &self,
        form: &JdAnalysisForm,
    ) -> Result<JdAnalysisResult, ClientError> {
        let request = form.validate()?;

        let response = self
            .http
            .post(format!("{}/api/analyze/job", self.base_url))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, field) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => (parsed.message, parsed.field),
        Err(_) => (GENERIC_FAILURE.to_string(), None),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        field,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Router};
    use serde_json::json;

    use super::*;
    use crate::log_store::{AnalysisKind, MemoryLogStore};
    use crate::routes::build_router;
    use crate::testing::{app_state, serve, NlpCall, StubNlp};

    fn jd_form(description: &str, top_n: Option<&str>, threshold: Option<&str>) -> JdAnalysisForm {
        JdAnalysisForm {
            description: description.to_string(),
            top_n: top_n.map(String::from),
            threshold: threshold.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_resume_scenario_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let reply = json!({
            "matchScore": 73.6,
            "techSkillsFound": ["Python"],
            "softSkillsFound": [],
            "missingTechSkills": ["Go"],
            "missingSoftSkills": ["Communication"],
            "recommendation": "Solid fit"
        });
        let nlp = StubNlp::replying(reply.clone());
        let logs = Arc::new(MemoryLogStore::new());
        let base = serve(build_router(app_state(nlp.clone(), logs.clone(), dir.path()))).await;
        let client = ScreeningClient::new(base);

        let result = client
            .screen_resume("cv.pdf", b"%PDF-1.4 resume".to_vec(), "Senior Backend Engineer")
            .await
            .unwrap();

        assert_eq!(result, serde_json::from_value::<ResumeScreeningResult>(reply).unwrap());
        let stored = logs.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, AnalysisKind::Resume);
        assert_eq!(stored[0].score, Some(74));

        match &nlp.calls()[..] {
            [NlpCall::Resume {
                job_role,
                file_name,
                staged_path,
                ..
            }] => {
                assert_eq!(job_role, "Senior Backend Engineer");
                assert_eq!(file_name, "cv.pdf");
                assert!(!staged_path.exists());
            }
            other => panic!("unexpected calls: {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_jd_scenario_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let nlp = StubNlp::replying(json!({
            "techSkills": [{ "skill": "backend", "score": 0.8 }],
            "softSkills": [{ "skill": "ownership", "score": 0.7 }]
        }));
        let logs = Arc::new(MemoryLogStore::new());
        let base = serve(build_router(app_state(nlp.clone(), logs.clone(), dir.path()))).await;
        let client = ScreeningClient::new(format!("{base}/"));

        let result = client
            .analyze_job(&jd_form("Build and own backend services", Some("5"), Some("0.3")))
            .await
            .unwrap();

        assert_eq!(result.tech_skills[0].skill, "backend");
        assert_eq!(result.soft_skills[0].skill, "ownership");
        match &nlp.calls()[..] {
            [NlpCall::Jd(forwarded)] => {
                assert_eq!(forwarded.description, "Build and own backend services");
                assert_eq!(forwarded.top_n, 5);
                assert!((forwarded.threshold - 0.3).abs() < f64::EPSILON);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
        let stored = logs.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, AnalysisKind::Job);
        assert_eq!(stored[0].score, None);
    }

    #[tokio::test]
    async fn test_invalid_jd_fails_without_round_trip() {
        // nothing listens here; a sent request would surface as a transport error
        let client = ScreeningClient::new("http://127.0.0.1:9");

        let err = client
            .analyze_job(&jd_form("too short", None, None))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Invalid(_)));
        assert_eq!(err.field(), Some("description"));
    }

    #[tokio::test]
    async fn test_empty_job_role_fails_without_round_trip() {
        let client = ScreeningClient::new("http://127.0.0.1:9");

        let err = client
            .screen_resume("cv.pdf", b"%PDF".to_vec(), "")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("jobRole"));

        let err = client
            .screen_resume("cv.pdf", Vec::new(), "QA")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("file"));
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let logs = Arc::new(MemoryLogStore::new());
        let base = serve(build_router(app_state(
            StubNlp::failing(500, "Job role not found in dataset"),
            logs.clone(),
            dir.path(),
        )))
        .await;
        let client = ScreeningClient::new(base);

        let err = client
            .screen_resume("cv.pdf", b"%PDF".to_vec(), "Astronaut")
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message, .. } => {
                assert_eq!(status, 500);
                assert!(message.contains("Job role not found in dataset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(logs.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_nlp_service_is_reported() {
        use crate::analysis::AnalysisService;
        use crate::nlp_client::HttpNlpClient;
        use crate::state::AppState;
        use crate::testing::test_config;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let nlp_url = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let logs = Arc::new(MemoryLogStore::new());
        let nlp = HttpNlpClient::new(nlp_url, Duration::from_secs(5)).unwrap();
        let state = AppState {
            config: test_config(dir.path()),
            analysis: AnalysisService::new(Arc::new(nlp), logs.clone(), dir.path().to_path_buf()),
        };
        let client = ScreeningClient::new(serve(build_router(state)).await);

        let err = client
            .analyze_job(&jd_form("Build and own backend services", None, None))
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message, .. } => {
                assert_eq!(status, 500);
                assert!(message.contains("Analysis failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_error_body_uses_generic_message() {
        let router = Router::new().route(
            "/api/analyze/job",
            post(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }),
        );
        let client = ScreeningClient::new(serve(router).await);

        let err = client
            .analyze_job(&jd_form("Build and own backend services", None, None))
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message, field } => {
                assert_eq!(status, 502);
                assert_eq!(message, GENERIC_FAILURE);
                assert!(field.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
