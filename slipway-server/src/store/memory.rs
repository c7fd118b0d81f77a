//! In-memory store implementations
//!
//! All state is held in memory and lost on restart. The service tests run
//! against this backend so the suite needs no database.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use slipway_core::domain::pipeline::PipelineRecord;
use slipway_core::domain::repo_config::RepoConfig;

use super::{PipelineRecordStore, RepoConfigStore, StoreError};

/// In-memory repository configuration store
pub struct InMemoryRepoConfigStore {
    configs: RwLock<Vec<RepoConfig>>,
    next_id: AtomicI64,
}

impl InMemoryRepoConfigStore {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryRepoConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoConfigStore for InMemoryRepoConfigStore {
    async fn save(&self, config: RepoConfig) -> Result<RepoConfig, StoreError> {
        let mut config = config;
        let now = chrono::Utc::now();
        let mut configs = self.configs.write().await;

        if config.id == 0 {
            config.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            config.created_at = now;
            config.updated_at = now;
            configs.push(config.clone());
        } else {
            config.updated_at = now;
            if let Some(existing) = configs.iter_mut().find(|c| c.id == config.id) {
                config.created_at = existing.created_at;
                *existing = config.clone();
            } else {
                configs.push(config.clone());
            }
        }

        Ok(config)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepoConfig>, StoreError> {
        let configs = self.configs.read().await;
        Ok(configs.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_url(&self, repo_url: &str) -> Result<Option<RepoConfig>, StoreError> {
        let configs = self.configs.read().await;
        Ok(configs.iter().find(|c| c.repo_url == repo_url).cloned())
    }

    async fn list_all(&self) -> Result<Vec<RepoConfig>, StoreError> {
        let configs = self.configs.read().await;
        Ok(configs.iter().rev().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut configs = self.configs.write().await;
        let before = configs.len();
        configs.retain(|c| c.id != id);
        Ok(configs.len() < before)
    }
}

/// In-memory pipeline record store
pub struct InMemoryPipelineRecordStore {
    records: RwLock<Vec<PipelineRecord>>,
    next_id: AtomicI64,
}

impl InMemoryPipelineRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryPipelineRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineRecordStore for InMemoryPipelineRecordStore {
    async fn save(&self, record: PipelineRecord) -> Result<PipelineRecord, StoreError> {
        let mut record = record;
        let now = chrono::Utc::now();
        let mut records = self.records.write().await;

        // Deliveries sharing an external id collapse into one row,
        // keeping the original created_at.
        if record.id == 0 {
            if let Some(external_id) = record.external_id.as_deref() {
                if !external_id.is_empty() {
                    if let Some(existing) = records
                        .iter()
                        .find(|r| r.external_id.as_deref() == Some(external_id))
                    {
                        record.id = existing.id;
                        record.created_at = existing.created_at;
                    }
                }
            }
        }

        if record.id == 0 {
            record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            record.created_at = now;
            record.updated_at = now;
            records.push(record.clone());
        } else {
            record.updated_at = now;
            if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
                record.created_at = existing.created_at;
                *existing = record.clone();
            } else {
                records.push(record.clone());
            }
        }

        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PipelineRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<PipelineRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PipelineRecord>, StoreError> {
        let records = self.records.read().await;
        let mut all: Vec<PipelineRecord> = records.iter().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }
}
