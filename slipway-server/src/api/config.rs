//! Repository Configuration API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use slipway_core::dto::config::{ConfigureRepoRequest, RepoConfigView};

use super::{AppState, auth::Identity, error::ApiError, error::ApiResult};
use crate::service::ingest::{self, IngestError};

/// POST /api/v1/devops/config - Create or update a repository configuration
pub async fn configure_repo(
    _identity: Identity,
    State(state): State<AppState>,
    Json(req): Json<ConfigureRepoRequest>,
) -> ApiResult<Json<RepoConfigView>> {
    if req.repo_url.trim().is_empty() {
        return Err(ApiError::BadRequest("repo_url is required".to_string()));
    }

    let view = ingest::configure_repository(&state.stores, req)
        .await
        .map_err(map_ingest_error)?;

    Ok(Json(view))
}

/// DELETE /api/v1/devops/config/{id} - Remove a repository configuration
pub async fn delete_repo(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ingest::delete_repository(&state.stores, id)
        .await
        .map_err(map_ingest_error)?;

    Ok(StatusCode::NO_CONTENT)
}

fn map_ingest_error(e: IngestError) -> ApiError {
    match e {
        IngestError::NotFound(id) => {
            ApiError::NotFound(format!("Repository configuration {} not found", id))
        }
        IngestError::StorageError(err) => ApiError::StorageError(err),
    }
}
