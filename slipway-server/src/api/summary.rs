//! Dashboard Summary API Handler

use axum::{Json, extract::State};
use slipway_core::dto::summary::SummaryResponse;

use super::{AppState, auth::Identity, error::ApiError, error::ApiResult};
use crate::service::ingest::{self, IngestError};

/// GET /api/v1/devops/summary - Configured repositories and recent pipelines
pub async fn get_summary(
    _identity: Identity,
    State(state): State<AppState>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = ingest::get_summary(&state.stores)
        .await
        .map_err(|e| match e {
            IngestError::NotFound(id) => ApiError::NotFound(format!("Not found: {}", id)),
            IngestError::StorageError(err) => ApiError::StorageError(err),
        })?;

    Ok(Json(summary))
}
