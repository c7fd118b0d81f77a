//! Postgres store implementations
//!
//! Handles all database operations for repository configurations and
//! pipeline records.

use async_trait::async_trait;
use slipway_core::domain::pipeline::{PipelineRecord, PipelineStatus};
use slipway_core::domain::repo_config::{RepoConfig, RepoKind};
use sqlx::PgPool;

use super::{PipelineRecordStore, RepoConfigStore, StoreError};

/// Postgres-backed repository configuration store
pub struct PostgresRepoConfigStore {
    pool: PgPool,
}

impl PostgresRepoConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepoConfigStore for PostgresRepoConfigStore {
    async fn save(&self, config: RepoConfig) -> Result<RepoConfig, StoreError> {
        let now = chrono::Utc::now();

        let row = if config.id == 0 {
            sqlx::query_as::<_, RepoConfigRow>(
                r#"
                INSERT INTO repo_configs (
                    name, kind, repo_url, deploy_action, access_token,
                    webhook_secret, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                RETURNING id, name, kind, repo_url, deploy_action, access_token,
                          webhook_secret, created_at, updated_at
                "#,
            )
            .bind(&config.name)
            .bind(config.kind.as_str())
            .bind(&config.repo_url)
            .bind(&config.deploy_action)
            .bind(&config.access_token)
            .bind(&config.webhook_secret)
            .bind(now)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, RepoConfigRow>(
                r#"
                UPDATE repo_configs
                SET name = $1, kind = $2, repo_url = $3, deploy_action = $4,
                    access_token = $5, webhook_secret = $6, updated_at = $7
                WHERE id = $8
                RETURNING id, name, kind, repo_url, deploy_action, access_token,
                          webhook_secret, created_at, updated_at
                "#,
            )
            .bind(&config.name)
            .bind(config.kind.as_str())
            .bind(&config.repo_url)
            .bind(&config.deploy_action)
            .bind(&config.access_token)
            .bind(&config.webhook_secret)
            .bind(now)
            .bind(config.id)
            .fetch_one(&self.pool)
            .await?
        };

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepoConfig>, StoreError> {
        let row = sqlx::query_as::<_, RepoConfigRow>(
            r#"
            SELECT id, name, kind, repo_url, deploy_action, access_token,
                   webhook_secret, created_at, updated_at
            FROM repo_configs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_url(&self, repo_url: &str) -> Result<Option<RepoConfig>, StoreError> {
        let row = sqlx::query_as::<_, RepoConfigRow>(
            r#"
            SELECT id, name, kind, repo_url, deploy_action, access_token,
                   webhook_secret, created_at, updated_at
            FROM repo_configs
            WHERE repo_url = $1
            "#,
        )
        .bind(repo_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_all(&self) -> Result<Vec<RepoConfig>, StoreError> {
        let rows = sqlx::query_as::<_, RepoConfigRow>(
            r#"
            SELECT id, name, kind, repo_url, deploy_action, access_token,
                   webhook_secret, created_at, updated_at
            FROM repo_configs
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM repo_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Postgres-backed pipeline record store
pub struct PostgresPipelineRecordStore {
    pool: PgPool,
}

impl PostgresPipelineRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineRecordStore for PostgresPipelineRecordStore {
    async fn save(&self, record: PipelineRecord) -> Result<PipelineRecord, StoreError> {
        let mut record = record;

        // Deliveries sharing an external id collapse into one row,
        // keeping the original created_at.
        if record.id == 0 {
            if let Some(external_id) = record.external_id.as_deref() {
                if !external_id.is_empty() {
                    if let Some(existing) = self.find_by_external_id(external_id).await? {
                        record.id = existing.id;
                        record.created_at = existing.created_at;
                    }
                }
            }
        }

        let now = chrono::Utc::now();

        let row = if record.id == 0 {
            sqlx::query_as::<_, PipelineRecordRow>(
                r#"
                INSERT INTO pipeline_records (
                    repo_config_id, external_id, git_ref, commit_sha, commit_msg,
                    author, status, duration_secs, started_at, finished_at,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
                RETURNING id, repo_config_id, external_id, git_ref, commit_sha,
                          commit_msg, author, status, duration_secs, started_at,
                          finished_at, created_at, updated_at
                "#,
            )
            .bind(record.repo_config_id)
            .bind(&record.external_id)
            .bind(&record.git_ref)
            .bind(&record.commit_sha)
            .bind(&record.commit_msg)
            .bind(&record.author)
            .bind(record.status.as_str())
            .bind(record.duration_secs)
            .bind(record.started_at)
            .bind(record.finished_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PipelineRecordRow>(
                r#"
                UPDATE pipeline_records
                SET repo_config_id = $1, external_id = $2, git_ref = $3,
                    commit_sha = $4, commit_msg = $5, author = $6, status = $7,
                    duration_secs = $8, started_at = $9, finished_at = $10,
                    updated_at = $11
                WHERE id = $12
                RETURNING id, repo_config_id, external_id, git_ref, commit_sha,
                          commit_msg, author, status, duration_secs, started_at,
                          finished_at, created_at, updated_at
                "#,
            )
            .bind(record.repo_config_id)
            .bind(&record.external_id)
            .bind(&record.git_ref)
            .bind(&record.commit_sha)
            .bind(&record.commit_msg)
            .bind(&record.author)
            .bind(record.status.as_str())
            .bind(record.duration_secs)
            .bind(record.started_at)
            .bind(record.finished_at)
            .bind(now)
            .bind(record.id)
            .fetch_one(&self.pool)
            .await?
        };

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PipelineRecord>, StoreError> {
        let row = sqlx::query_as::<_, PipelineRecordRow>(
            r#"
            SELECT id, repo_config_id, external_id, git_ref, commit_sha,
                   commit_msg, author, status, duration_secs, started_at,
                   finished_at, created_at, updated_at
            FROM pipeline_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<PipelineRecord>, StoreError> {
        let row = sqlx::query_as::<_, PipelineRecordRow>(
            r#"
            SELECT id, repo_config_id, external_id, git_ref, commit_sha,
                   commit_msg, author, status, duration_secs, started_at,
                   finished_at, created_at, updated_at
            FROM pipeline_records
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PipelineRecord>, StoreError> {
        let rows = sqlx::query_as::<_, PipelineRecordRow>(
            r#"
            SELECT id, repo_config_id, external_id, git_ref, commit_sha,
                   commit_msg, author, status, duration_secs, started_at,
                   finished_at, created_at, updated_at
            FROM pipeline_records
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RepoConfigRow {
    id: i64,
    name: String,
    kind: String,
    repo_url: String,
    deploy_action: String,
    access_token: String,
    webhook_secret: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RepoConfigRow> for RepoConfig {
    fn from(row: RepoConfigRow) -> Self {
        RepoConfig {
            id: row.id,
            name: row.name,
            kind: RepoKind::from_db_str(&row.kind),
            repo_url: row.repo_url,
            deploy_action: row.deploy_action,
            access_token: row.access_token,
            webhook_secret: row.webhook_secret,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PipelineRecordRow {
    id: i64,
    repo_config_id: i64,
    external_id: Option<String>,
    git_ref: String,
    commit_sha: String,
    commit_msg: String,
    author: String,
    status: String,
    duration_secs: i64,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PipelineRecordRow> for PipelineRecord {
    fn from(row: PipelineRecordRow) -> Self {
        PipelineRecord {
            id: row.id,
            repo_config_id: row.repo_config_id,
            external_id: row.external_id,
            git_ref: row.git_ref,
            commit_sha: row.commit_sha,
            commit_msg: row.commit_msg,
            author: row.author,
            status: PipelineStatus::from_db_str(&row.status),
            duration_secs: row.duration_secs,
            started_at: row.started_at,
            finished_at: row.finished_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
