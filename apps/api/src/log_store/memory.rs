use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::{AnalysisLog, LogStore, NewAnalysisLog, StoreError};

/// In-process log store. Not durable across restarts.
#[derive(Default)]
pub struct MemoryLogStore {
    entries: Mutex<Vec<AnalysisLog>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every stored record, in insertion order.
    pub fn snapshot(&self) -> Vec<AnalysisLog> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, entry: NewAnalysisLog) -> Result<AnalysisLog, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory log store lock poisoned".to_string()))?;

        // id assignment and push happen under one lock, so ids are unique and monotonic
        let id = entries.last().map(|last| last.id + 1).unwrap_or(1);
        let stored = AnalysisLog::stored(entry, id, Utc::now());
        entries.push(stored.clone());

        info!("Inserted {} analysis log {id}", stored.kind.as_str());
        Ok(stored)
    }
}
