//! Persistence layer
//!
//! Storage is abstracted behind per-entity traits so the services run
//! against Postgres in production and an in-memory backend in tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use slipway_core::domain::pipeline::PipelineRecord;
use slipway_core::domain::repo_config::RepoConfig;

/// Store error type
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Storage for repository configurations
///
/// At most one configuration exists per repository URL; `save` with id 0
/// inserts, any other id updates that row.
#[async_trait]
pub trait RepoConfigStore: Send + Sync {
    /// Persist a configuration, returning the stored row with its assigned
    /// id and timestamps.
    async fn save(&self, config: RepoConfig) -> Result<RepoConfig, StoreError>;

    /// Find a configuration by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<RepoConfig>, StoreError>;

    /// Find a configuration by repository URL.
    async fn find_by_url(&self, repo_url: &str) -> Result<Option<RepoConfig>, StoreError>;

    /// List all configurations, newest first.
    async fn list_all(&self) -> Result<Vec<RepoConfig>, StoreError>;

    /// Delete a configuration. Returns false when no row matched.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// Storage for pipeline records
#[async_trait]
pub trait PipelineRecordStore: Send + Sync {
    /// Persist a record, returning the stored row.
    ///
    /// Upsert semantics: a record with id 0 carrying an external id that is
    /// already present updates the existing row in place (keeping its
    /// original `created_at`); a record with a nonzero id updates that row;
    /// everything else inserts.
    async fn save(&self, record: PipelineRecord) -> Result<PipelineRecord, StoreError>;

    /// Find a record by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<PipelineRecord>, StoreError>;

    /// Find a record by its platform correlation id.
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<PipelineRecord>, StoreError>;

    /// List the most recent records, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<PipelineRecord>, StoreError>;
}

/// Cloneable bundle of store handles passed through the service layer
#[derive(Clone)]
pub struct Stores {
    pub repo_configs: Arc<dyn RepoConfigStore>,
    pub pipeline_records: Arc<dyn PipelineRecordStore>,
}

impl Stores {
    /// Stores backed by Postgres.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Stores {
            repo_configs: Arc::new(postgres::PostgresRepoConfigStore::new(pool.clone())),
            pipeline_records: Arc::new(postgres::PostgresPipelineRecordStore::new(pool)),
        }
    }

    /// Stores backed by process memory. State is lost on restart.
    pub fn memory() -> Self {
        Stores {
            repo_configs: Arc::new(memory::InMemoryRepoConfigStore::new()),
            pipeline_records: Arc::new(memory::InMemoryPipelineRecordStore::new()),
        }
    }
}
