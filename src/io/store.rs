use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::models::AnalysisRecord;

/// External record store for analysis runs.
///
/// Runs are append-only: inserting never replaces an earlier record.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist one analysis run
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<()>;

    /// Set the processed flag on the parent document
    async fn mark_processed(&self, document_id: &str) -> Result<()>;

    /// Most recent run for a document, by `analyzed_at`
    async fn latest_analysis(&self, document_id: &str) -> Result<Option<AnalysisRecord>>;

    async fn is_processed(&self, document_id: &str) -> Result<bool>;
}

/// In-process store, useful for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<AnalysisRecord>>>,
    processed: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All runs recorded for a document, oldest first
    pub fn history(&self, document_id: &str) -> Vec<AnalysisRecord> {
        self.records
            .lock()
            .map(|r| r.get(document_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("analysis store lock poisoned"))?;
        records
            .entry(record.document_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn mark_processed(&self, document_id: &str) -> Result<()> {
        self.processed
            .lock()
            .map_err(|_| anyhow::anyhow!("analysis store lock poisoned"))?
            .insert(document_id.to_string());
        Ok(())
    }

    async fn latest_analysis(&self, document_id: &str) -> Result<Option<AnalysisRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("analysis store lock poisoned"))?;
        Ok(records
            .get(document_id)
            .and_then(|runs| runs.iter().max_by_key(|r| r.analyzed_at))
            .cloned())
    }

    async fn is_processed(&self, document_id: &str) -> Result<bool> {
        Ok(self
            .processed
            .lock()
            .map_err(|_| anyhow::anyhow!("analysis store lock poisoned"))?
            .contains(document_id))
    }
}

/// Directory-backed store: one JSON file per run under `<root>/<document_id>/`,
/// plus a `processed` marker file
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_dir(&self, document_id: &str) -> PathBuf {
        let safe: String = document_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(safe)
    }
}

#[async_trait]
impl AnalysisStore for JsonDirStore {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        let dir = self.document_dir(&record.document_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;

        let path = dir.join(format!(
            "{}-{}.json",
            record.analyzed_at.format("%Y%m%dT%H%M%S%.3fZ"),
            record.id
        ));
        let json = serde_json::to_vec_pretty(record).context("Failed to serialize record")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write record: {:?}", path))?;

        debug!("Stored analysis run at {:?}", path);
        Ok(())
    }

    async fn mark_processed(&self, document_id: &str) -> Result<()> {
        let dir = self.document_dir(document_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        tokio::fs::write(dir.join("processed"), b"true")
            .await
            .context("Failed to write processed marker")?;
        Ok(())
    }

    async fn latest_analysis(&self, document_id: &str) -> Result<Option<AnalysisRecord>> {
        let dir = self.document_dir(document_id);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(None);
        }

        let mut latest: Option<AnalysisRecord> = None;
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to read directory: {:?}", dir))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read record: {:?}", path))?;
            let record: AnalysisRecord = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse record: {:?}", path))?;

            if latest
                .as_ref()
                .is_none_or(|current| record.analyzed_at > current.analyzed_at)
            {
                latest = Some(record);
            }
        }

        Ok(latest)
    }

    async fn is_processed(&self, document_id: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.document_dir(document_id).join("processed"))
            .await
            .unwrap_or(false))
    }
}
