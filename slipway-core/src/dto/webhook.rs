//! Canonical webhook event

use serde::{Deserialize, Serialize};

/// Platform-independent CI event produced by the normalizers
///
/// Transient shape: carried from the HTTP layer into the ingestion service,
/// never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Source event kind as named by the platform (`push`, `workflow_run`,
    /// `pipeline`).
    pub event_kind: String,
    pub repo_url: String,
    pub git_ref: String,
    pub commit_sha: String,
    pub commit_msg: String,
    pub author: String,
    /// Raw platform status string; mapped through
    /// [`PipelineStatus::from_event`](crate::domain::pipeline::PipelineStatus::from_event)
    /// at ingestion time.
    pub status: String,
}
