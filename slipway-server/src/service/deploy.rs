//! Deployment Service
//!
//! Runs configured deploy actions and records their outcome as pipeline
//! records. The synchronous phase persists a `Running` record before
//! anything executes; the command itself runs in a detached task.

use slipway_core::domain::pipeline::{PipelineRecord, PipelineStatus};
use tokio::task::JoinHandle;

use crate::store::{StoreError, Stores};

/// Author recorded on deployment-triggered pipeline records
const SYSTEM_AUTHOR: &str = "system";

/// Captured command output is cut to this many characters before persisting
const MAX_OUTPUT_CHARS: usize = 500;

/// Service error type
#[derive(Debug)]
pub enum DeployError {
    NotFound(i64),
    NoDeployAction(i64),
    StorageError(StoreError),
}

impl From<StoreError> for DeployError {
    fn from(err: StoreError) -> Self {
        DeployError::StorageError(err)
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

/// Start a deployment for a configured repository
///
/// Returns the persisted `Running` record together with the handle of the
/// detached execution task. Callers that only want fire-and-forget behavior
/// drop the handle; tests await it.
pub async fn trigger_deployment(
    stores: &Stores,
    repo_config_id: i64,
) -> Result<(PipelineRecord, JoinHandle<()>)> {
    let config = stores
        .repo_configs
        .find_by_id(repo_config_id)
        .await?
        .ok_or(DeployError::NotFound(repo_config_id))?;

    if config.deploy_action.trim().is_empty() {
        return Err(DeployError::NoDeployAction(repo_config_id));
    }

    let now = chrono::Utc::now();
    let record = PipelineRecord {
        id: 0,
        repo_config_id: config.id,
        external_id: None,
        git_ref: String::new(),
        commit_sha: String::new(),
        commit_msg: format!("Deployment of {}", config.name),
        author: SYSTEM_AUTHOR.to_string(),
        status: PipelineStatus::Running,
        duration_secs: 0,
        started_at: Some(now),
        finished_at: None,
        created_at: now,
        updated_at: now,
    };

    let record = stores.pipeline_records.save(record).await?;

    tracing::info!(
        "Deployment started for repo {} (record {})",
        config.id,
        record.id
    );

    let handle = spawn_deploy_task(stores.clone(), record.clone(), config.deploy_action);

    Ok((record, handle))
}

/// Spawns the detached execution task for an already-persisted Running record
fn spawn_deploy_task(
    stores: Stores,
    record: PipelineRecord,
    deploy_action: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started_at = record.started_at.unwrap_or(record.created_at);

        let (status, output) = run_deploy_action(&deploy_action).await;

        let finished_at = chrono::Utc::now();

        let mut update = record;
        update.status = status;
        update.duration_secs = (finished_at - started_at).num_seconds();
        update.finished_at = Some(finished_at);
        update.commit_msg = truncate_output(&output);

        if let Err(err) = stores.pipeline_records.save(update).await {
            // The command already ran; all that is left is to log.
            tracing::error!("Failed to persist deployment outcome: {:?}", err);
        }
    })
}

/// Run the deploy action through the shell and capture its combined output
async fn run_deploy_action(action: &str) -> (PipelineStatus, String) {
    let result = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(action)
        .output()
        .await;

    match result {
        Ok(output) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            let status = if output.status.success() {
                PipelineStatus::Success
            } else {
                PipelineStatus::Failed
            };

            (status, combined)
        }
        Err(err) => (
            PipelineStatus::Failed,
            format!("failed to run deploy action: {}", err),
        ),
    }
}

/// Cut captured output to at most [`MAX_OUTPUT_CHARS`] characters
fn truncate_output(output: &str) -> String {
    if output.chars().count() <= MAX_OUTPUT_CHARS {
        return output.to_string();
    }

    let mut truncated: String = output.chars().take(MAX_OUTPUT_CHARS).collect();
    truncated.push_str("...");
    truncated
}
