//! Test doubles and helpers shared by the in-crate test modules.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use crate::analysis::upload::StagedUpload;
use crate::analysis::validation::JdAnalysisRequest;
use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::log_store::{AnalysisLog, LogStore, NewAnalysisLog, StoreError};
use crate::nlp_client::{NlpError, NlpService};
use crate::state::AppState;

/// A call observed by `StubNlp`.
#[derive(Debug, Clone)]
pub enum NlpCall {
    Resume {
        job_role: String,
        file_name: String,
        bytes: Vec<u8>,
        staged_path: PathBuf,
    },
    Jd(JdAnalysisRequest),
}

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Fail { status: u16, message: String },
}

/// `NlpService` that records every call and answers with a canned reply.
pub struct StubNlp {
    reply: Reply,
    calls: Mutex<Vec<NlpCall>>,
}

impl StubNlp {
    pub fn replying(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Json(payload),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail {
                status,
                message: message.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<NlpCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: NlpCall) -> Result<Value, NlpError> {
        self.calls.lock().unwrap().push(call);
        match &self.reply {
            Reply::Json(payload) => Ok(payload.clone()),
            Reply::Fail { status, message } => Err(NlpError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[async_trait]
impl NlpService for StubNlp {
    async fn analyze_resume(
        &self,
        upload: &StagedUpload,
        job_role: &str,
    ) -> Result<Value, NlpError> {
        let bytes = tokio::fs::read(upload.path()).await?;
        self.respond(NlpCall::Resume {
            job_role: job_role.to_string(),
            file_name: upload.file_name().to_string(),
            bytes,
            staged_path: upload.path().to_path_buf(),
        })
    }

    async fn analyze_jd(&self, request: &JdAnalysisRequest) -> Result<Value, NlpError> {
        self.respond(NlpCall::Jd(request.clone()))
    }
}

/// `LogStore` whose every append fails.
pub struct FailingLogStore;

#[async_trait]
impl LogStore for FailingLogStore {
    async fn append(&self, _entry: NewAnalysisLog) -> Result<AnalysisLog, StoreError> {
        Err(StoreError::Unavailable("database is down".to_string()))
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: None,
        nlp_base_url: "http://127.0.0.1:9".to_string(),
        nlp_timeout: Duration::from_secs(5),
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn app_state(
    nlp: Arc<dyn NlpService>,
    logs: Arc<dyn LogStore>,
    upload_dir: &Path,
) -> AppState {
    AppState {
        config: test_config(upload_dir),
        analysis: AnalysisService::new(nlp, logs, upload_dir.to_path_buf()),
    }
}

pub async fn stage_bytes(dir: &Path, bytes: &[u8]) -> StagedUpload {
    StagedUpload::from_bytes(bytes, "resume.pdf", dir)
        .await
        .unwrap()
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
