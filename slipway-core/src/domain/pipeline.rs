//! Pipeline record domain types

use serde::{Deserialize, Serialize};

/// A single observed or triggered pipeline execution
///
/// Webhook deliveries and deployments both persist into this shape. A record
/// in `Running` state has `started_at` set and `finished_at` unset;
/// `duration_secs` is meaningful only once both timestamps are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: i64,
    pub repo_config_id: i64,
    /// Correlation id from the originating platform (the commit SHA for
    /// webhook events). Deliveries sharing an external id upsert into one row.
    pub external_id: Option<String>,
    pub git_ref: String,
    pub commit_sha: String,
    pub commit_msg: String,
    pub author: String,
    pub status: PipelineStatus,
    pub duration_secs: i64,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
}

impl PipelineStatus {
    /// Map a raw platform status string onto the canonical set.
    ///
    /// Total: unrecognized and empty inputs map to `Pending`.
    pub fn from_event(s: &str) -> Self {
        match s {
            "success" => PipelineStatus::Success,
            "failed" | "failure" => PipelineStatus::Failed,
            "running" | "pending" => PipelineStatus::Running,
            "canceled" => PipelineStatus::Canceled,
            _ => PipelineStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Success => "success",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Canceled => "canceled",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "running" => PipelineStatus::Running,
            "success" => PipelineStatus::Success,
            "failed" => PipelineStatus::Failed,
            "canceled" => PipelineStatus::Canceled,
            _ => PipelineStatus::Pending,
        }
    }

    /// Whether the pipeline has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineStatus::Success | PipelineStatus::Failed | PipelineStatus::Canceled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_event_known_values() {
        assert_eq!(PipelineStatus::from_event("success"), PipelineStatus::Success);
        assert_eq!(PipelineStatus::from_event("failed"), PipelineStatus::Failed);
        assert_eq!(PipelineStatus::from_event("failure"), PipelineStatus::Failed);
        assert_eq!(PipelineStatus::from_event("running"), PipelineStatus::Running);
        assert_eq!(PipelineStatus::from_event("pending"), PipelineStatus::Running);
        assert_eq!(PipelineStatus::from_event("canceled"), PipelineStatus::Canceled);
    }

    #[test]
    fn test_from_event_is_total() {
        assert_eq!(PipelineStatus::from_event(""), PipelineStatus::Pending);
        assert_eq!(PipelineStatus::from_event("garbage"), PipelineStatus::Pending);
        assert_eq!(PipelineStatus::from_event("SUCCESS"), PipelineStatus::Pending);
    }

    #[test]
    fn test_db_str_round_trip() {
        for status in [
            PipelineStatus::Pending,
            PipelineStatus::Running,
            PipelineStatus::Success,
            PipelineStatus::Failed,
            PipelineStatus::Canceled,
        ] {
            assert_eq!(PipelineStatus::from_db_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineStatus::Success.is_terminal());
        assert!(PipelineStatus::Failed.is_terminal());
        assert!(PipelineStatus::Canceled.is_terminal());
        assert!(!PipelineStatus::Pending.is_terminal());
        assert!(!PipelineStatus::Running.is_terminal());
    }
}
