//! Summary DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::{PipelineRecord, PipelineStatus};
use crate::dto::config::RepoConfigView;

/// Dashboard overview: configured repositories plus recent pipeline activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub services: Vec<RepoConfigView>,
    pub pipelines: Vec<PipelineRecordView>,
}

/// Pipeline record annotated with the owning repository's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecordView {
    pub id: i64,
    pub repo_config_id: i64,
    pub repo_name: String,
    pub git_ref: String,
    pub commit_sha: String,
    pub commit_msg: String,
    pub author: String,
    pub status: PipelineStatus,
    pub duration_secs: i64,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineRecordView {
    pub fn from_record(record: PipelineRecord, repo_name: String) -> Self {
        PipelineRecordView {
            id: record.id,
            repo_config_id: record.repo_config_id,
            repo_name,
            git_ref: record.git_ref,
            commit_sha: record.commit_sha,
            commit_msg: record.commit_msg,
            author: record.author,
            status: record.status,
            duration_secs: record.duration_secs,
            started_at: record.started_at,
            finished_at: record.finished_at,
            created_at: record.created_at,
        }
    }
}
