//! Webhook Ingestion API Handler
//!
//! Open endpoint: hosting platforms deliver hooks without bearer tokens.
//! Deliveries for unconfigured repositories are acknowledged but not stored.

use axum::{
    Json,
    extract::{Path, State},
};

use super::{AppState, error::ApiError, error::ApiResult};
use crate::normalizer::{self, NormalizeError};
use crate::service::ingest::{self, IngestError, WebhookOutcome};

/// POST /api/v1/devops/webhooks/{platform} - Receive a platform webhook
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<serde_json::Value>> {
    let event = match platform.as_str() {
        "github" => normalizer::github::normalize(payload),
        "gitlab" => normalizer::gitlab::normalize(payload),
        other => {
            return Err(ApiError::NotFound(format!("Unknown platform: {}", other)));
        }
    }
    .map_err(|e| match e {
        NormalizeError::MalformedPayload(msg) => ApiError::BadRequest(msg),
    })?;

    let outcome = ingest::handle_webhook(&state.stores, event)
        .await
        .map_err(|e| match e {
            IngestError::NotFound(id) => ApiError::NotFound(format!("Not found: {}", id)),
            IngestError::StorageError(err) => ApiError::StorageError(err),
        })?;

    let body = match outcome {
        WebhookOutcome::Recorded(record) => {
            serde_json::json!({ "recorded": true, "record_id": record.id })
        }
        WebhookOutcome::Ignored => serde_json::json!({ "recorded": false }),
    };

    Ok(Json(body))
}
