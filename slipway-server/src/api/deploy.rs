//! Deployment API Handler

use axum::{
    Json,
    extract::{Path, State},
};
use slipway_core::domain::pipeline::PipelineRecord;

use super::{AppState, auth::Identity, error::ApiError, error::ApiResult};
use crate::service::deploy::{self, DeployError};

/// POST /api/v1/devops/deploy/{id} - Start a deployment for a repository
///
/// Responds as soon as the `Running` record is persisted; the deploy action
/// itself finishes in the background.
pub async fn trigger_deploy(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PipelineRecord>> {
    let (record, _handle) = deploy::trigger_deployment(&state.stores, id)
        .await
        .map_err(|e| match e {
            DeployError::NotFound(id) => {
                ApiError::NotFound(format!("Repository configuration {} not found", id))
            }
            DeployError::NoDeployAction(id) => ApiError::BadRequest(format!(
                "Repository {} has no deploy action configured",
                id
            )),
            DeployError::StorageError(err) => ApiError::StorageError(err),
        })?;

    Ok(Json(record))
}
