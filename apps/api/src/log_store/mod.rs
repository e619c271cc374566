//! Append-only log of completed analyses.
//!
//! `AnalysisService` holds an `Arc<dyn LogStore>`: PostgreSQL in production,
//! the in-process store when no database is configured.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryLogStore;
pub use postgres::PgLogStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Log store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Resume,
    Job,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Resume => "resume",
            AnalysisKind::Job => "job",
        }
    }
}

/// A log record before the store has assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysisLog {
    pub kind: AnalysisKind,
    pub target_role: Option<String>,
    pub score: Option<i32>,
    pub results: Value,
}

impl NewAnalysisLog {
    pub fn resume(target_role: impl Into<String>, score: Option<i32>, results: Value) -> Self {
        Self {
            kind: AnalysisKind::Resume,
            target_role: Some(target_role.into()),
            score,
            results,
        }
    }

    pub fn job(results: Value) -> Self {
        Self {
            kind: AnalysisKind::Job,
            target_role: None,
            score: None,
            results,
        }
    }
}

/// A stored log record. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisLog {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub target_role: Option<String>,
    pub score: Option<i32>,
    pub results: Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisLog {
    fn stored(entry: NewAnalysisLog, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: entry.kind,
            target_role: entry.target_role,
            score: entry.score,
            results: entry.results,
            created_at,
        }
    }
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persists one record atomically, assigning its id and creation time.
    async fn append(&self, entry: NewAnalysisLog) -> Result<AnalysisLog, StoreError>;
}
