use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create repo_configs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repo_configs (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL DEFAULT '',
            kind VARCHAR(20) NOT NULL,
            repo_url TEXT NOT NULL,
            deploy_action TEXT NOT NULL DEFAULT '',
            access_token TEXT NOT NULL DEFAULT '',
            webhook_secret TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One configuration per repository URL
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_repo_configs_repo_url ON repo_configs(repo_url)",
    )
    .execute(pool)
    .await?;

    // Create pipeline_records table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_records (
            id BIGSERIAL PRIMARY KEY,
            repo_config_id BIGINT NOT NULL,
            external_id TEXT,
            git_ref TEXT NOT NULL DEFAULT '',
            commit_sha TEXT NOT NULL DEFAULT '',
            commit_msg TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            status VARCHAR(50) NOT NULL,
            duration_secs BIGINT NOT NULL DEFAULT 0,
            started_at TIMESTAMPTZ,
            finished_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_records_external_id ON pipeline_records(external_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_records_repo_config_id ON pipeline_records(repo_config_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_records_created_at ON pipeline_records(created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
