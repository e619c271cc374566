use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use super::{AnalysisLog, LogStore, NewAnalysisLog, StoreError};

/// `analysis_logs` table. Rows are inserted once and never touched again.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn append(&self, entry: NewAnalysisLog) -> Result<AnalysisLog, StoreError> {
        // Append-only: a single INSERT, id and timestamp assigned by the database
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO analysis_logs (type, target_role, score, results)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(&entry.target_role)
        .bind(entry.score)
        .bind(&entry.results)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted {} analysis log {id}", entry.kind.as_str());

        Ok(AnalysisLog::stored(entry, id, created_at))
    }
}
