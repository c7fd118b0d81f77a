//! Ingestion Service
//!
//! Business logic for repository configuration, the dashboard summary, and
//! webhook event ingestion.

use slipway_core::domain::pipeline::{PipelineRecord, PipelineStatus};
use slipway_core::domain::repo_config::RepoConfig;
use slipway_core::dto::config::{ConfigureRepoRequest, RepoConfigView};
use slipway_core::dto::summary::{PipelineRecordView, SummaryResponse};
use slipway_core::dto::webhook::WebhookEvent;
use uuid::Uuid;

use crate::service::deploy;
use crate::store::{StoreError, Stores};

/// How many pipeline records the summary view returns
const RECENT_PIPELINES_LIMIT: i64 = 10;

/// Refs eligible for automatic deployment
const DEFAULT_BRANCH_REFS: [&str; 2] = ["refs/heads/main", "main"];

/// Display name used when a record's repository is no longer configured
const UNKNOWN_REPO_NAME: &str = "Unknown";

/// Service error type
#[derive(Debug)]
pub enum IngestError {
    NotFound(i64),
    StorageError(StoreError),
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        IngestError::StorageError(err)
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Outcome of a webhook delivery
#[derive(Debug)]
pub enum WebhookOutcome {
    /// The event was persisted for a configured repository.
    Recorded(PipelineRecord),
    /// No configuration matches the event's repository URL; nothing stored.
    Ignored,
}

/// Create or update a repository configuration
///
/// Configurations are keyed by repository URL. The webhook secret is
/// generated exactly once, at creation; an empty access token on update
/// leaves the stored token untouched.
pub async fn configure_repository(
    stores: &Stores,
    req: ConfigureRepoRequest,
) -> Result<RepoConfigView> {
    let existing = stores.repo_configs.find_by_url(&req.repo_url).await?;

    let config = match existing {
        Some(mut config) => {
            config.name = req.name;
            config.kind = req.kind;
            config.deploy_action = req.deploy_action;
            if !req.access_token.is_empty() {
                config.access_token = req.access_token;
            }
            config
        }
        None => {
            let now = chrono::Utc::now();
            RepoConfig {
                id: 0,
                name: req.name,
                kind: req.kind,
                repo_url: req.repo_url,
                deploy_action: req.deploy_action,
                access_token: req.access_token,
                webhook_secret: Uuid::new_v4().simple().to_string(),
                created_at: now,
                updated_at: now,
            }
        }
    };

    let saved = stores.repo_configs.save(config).await?;

    tracing::info!("Repository configured: {} ({})", saved.repo_url, saved.id);

    Ok(saved.into())
}

/// Delete a repository configuration
pub async fn delete_repository(stores: &Stores, id: i64) -> Result<()> {
    let deleted = stores.repo_configs.delete(id).await?;

    if !deleted {
        return Err(IngestError::NotFound(id));
    }

    tracing::info!("Repository configuration deleted: {}", id);

    Ok(())
}

/// Dashboard overview of configured repositories and recent activity
pub async fn get_summary(stores: &Stores) -> Result<SummaryResponse> {
    let configs = stores.repo_configs.list_all().await?;
    let records = stores
        .pipeline_records
        .list_recent(RECENT_PIPELINES_LIMIT)
        .await?;

    let services: Vec<RepoConfigView> = configs.iter().cloned().map(|c| c.into()).collect();

    let pipelines = records
        .into_iter()
        .map(|record| {
            let repo_name = configs
                .iter()
                .find(|c| c.id == record.repo_config_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNKNOWN_REPO_NAME.to_string());
            PipelineRecordView::from_record(record, repo_name)
        })
        .collect();

    Ok(SummaryResponse {
        services,
        pipelines,
    })
}

/// Ingest a canonical webhook event
///
/// Deliveries for unconfigured repository URLs are ignored with no side
/// effects. Recorded events that pass the trigger gate start a deployment
/// in the background; deployment failures never reach the webhook caller.
pub async fn handle_webhook(stores: &Stores, event: WebhookEvent) -> Result<WebhookOutcome> {
    let config = match stores.repo_configs.find_by_url(&event.repo_url).await? {
        Some(config) => config,
        None => {
            tracing::warn!(
                "Ignoring webhook for unconfigured repository: {}",
                event.repo_url
            );
            return Ok(WebhookOutcome::Ignored);
        }
    };

    let status = PipelineStatus::from_event(&event.status);

    let now = chrono::Utc::now();
    let record = PipelineRecord {
        id: 0,
        repo_config_id: config.id,
        external_id: Some(event.commit_sha.clone()),
        git_ref: event.git_ref,
        commit_sha: event.commit_sha,
        commit_msg: event.commit_msg,
        author: event.author,
        status,
        duration_secs: 0,
        started_at: None,
        finished_at: None,
        created_at: now,
        updated_at: now,
    };

    let record = stores.pipeline_records.save(record).await?;

    tracing::info!(
        "Webhook recorded for {}: {} on {}",
        config.repo_url,
        status.as_str(),
        record.git_ref
    );

    if should_auto_deploy(status, &record.git_ref, &config.deploy_action) {
        let stores = stores.clone();
        let repo_config_id = config.id;
        tokio::spawn(async move {
            if let Err(err) = deploy::trigger_deployment(&stores, repo_config_id).await {
                tracing::error!(
                    "Auto-deployment failed for repo {}: {:?}",
                    repo_config_id,
                    err
                );
            }
        });
    }

    Ok(WebhookOutcome::Recorded(record))
}

/// Whether a recorded event should start a deployment
pub fn should_auto_deploy(status: PipelineStatus, git_ref: &str, deploy_action: &str) -> bool {
    status == PipelineStatus::Success
        && DEFAULT_BRANCH_REFS.contains(&git_ref)
        && !deploy_action.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_core::domain::repo_config::RepoKind;

    fn test_request(repo_url: &str, deploy_action: &str) -> ConfigureRepoRequest {
        ConfigureRepoRequest {
            id: 0,
            name: "api".to_string(),
            kind: RepoKind::GitHub,
            repo_url: repo_url.to_string(),
            deploy_action: deploy_action.to_string(),
            access_token: String::new(),
        }
    }

    fn test_event(repo_url: &str, git_ref: &str, status: &str, sha: &str) -> WebhookEvent {
        WebhookEvent {
            event_kind: "push".to_string(),
            repo_url: repo_url.to_string(),
            git_ref: git_ref.to_string(),
            commit_sha: sha.to_string(),
            commit_msg: "update".to_string(),
            author: "alice".to_string(),
            status: status.to_string(),
        }
    }

    async fn wait_for_terminal_deployment(stores: &Stores) -> Option<PipelineRecord> {
        for _ in 0..50 {
            let recent = stores.pipeline_records.list_recent(10).await.unwrap();
            if let Some(record) = recent
                .iter()
                .find(|r| r.author == "system" && r.status.is_terminal())
            {
                return Some(record.clone());
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_configure_generates_secret_once() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";

        let mut req = test_request(url, "");
        req.access_token = "tok-1".to_string();
        configure_repository(&stores, req).await.unwrap();

        let first = stores.repo_configs.find_by_url(url).await.unwrap().unwrap();
        assert_eq!(first.webhook_secret.len(), 32);

        // Update with an empty token must keep both credentials.
        configure_repository(&stores, test_request(url, "./deploy.sh"))
            .await
            .unwrap();

        let second = stores.repo_configs.find_by_url(url).await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.webhook_secret, first.webhook_secret);
        assert_eq!(second.access_token, "tok-1");
        assert_eq!(second.deploy_action, "./deploy.sh");
    }

    #[tokio::test]
    async fn test_configure_replaces_token_when_provided() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";

        let mut req = test_request(url, "");
        req.access_token = "tok-1".to_string();
        configure_repository(&stores, req).await.unwrap();

        let mut req = test_request(url, "");
        req.access_token = "tok-2".to_string();
        configure_repository(&stores, req).await.unwrap();

        let config = stores.repo_configs.find_by_url(url).await.unwrap().unwrap();
        assert_eq!(config.access_token, "tok-2");
    }

    #[tokio::test]
    async fn test_delete_missing_repository() {
        let stores = Stores::memory();

        let result = delete_repository(&stores, 42).await;
        assert!(matches!(result, Err(IngestError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_webhook_for_unconfigured_repo_is_ignored() {
        let stores = Stores::memory();

        let outcome = handle_webhook(
            &stores,
            test_event("https://github.com/acme/ghost", "main", "success", "abc"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, WebhookOutcome::Ignored));
        let records = stores.pipeline_records.list_recent(10).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_delivery_is_idempotent() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";
        configure_repository(&stores, test_request(url, "")).await.unwrap();

        let first = match handle_webhook(
            &stores,
            test_event(url, "refs/heads/feature-x", "running", "sha-1"),
        )
        .await
        .unwrap()
        {
            WebhookOutcome::Recorded(record) => record,
            WebhookOutcome::Ignored => panic!("delivery should be recorded"),
        };

        let second = match handle_webhook(
            &stores,
            test_event(url, "refs/heads/feature-x", "success", "sha-1"),
        )
        .await
        .unwrap()
        {
            WebhookOutcome::Recorded(record) => record,
            WebhookOutcome::Ignored => panic!("delivery should be recorded"),
        };

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.status, PipelineStatus::Success);

        let records = stores.pipeline_records.list_recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_resolves_repo_names() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";
        configure_repository(&stores, test_request(url, "")).await.unwrap();

        handle_webhook(&stores, test_event(url, "main", "success", "sha-1"))
            .await
            .unwrap();

        // A record whose configuration no longer exists.
        let orphan = PipelineRecord {
            id: 0,
            repo_config_id: 999,
            external_id: None,
            git_ref: "main".to_string(),
            commit_sha: "sha-2".to_string(),
            commit_msg: "orphan".to_string(),
            author: "bob".to_string(),
            status: PipelineStatus::Failed,
            duration_secs: 0,
            started_at: None,
            finished_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        stores.pipeline_records.save(orphan).await.unwrap();

        let summary = get_summary(&stores).await.unwrap();
        assert_eq!(summary.services.len(), 1);
        assert_eq!(summary.pipelines.len(), 2);

        let names: Vec<&str> = summary
            .pipelines
            .iter()
            .map(|p| p.repo_name.as_str())
            .collect();
        assert!(names.contains(&"api"));
        assert!(names.contains(&"Unknown"));
    }

    #[tokio::test]
    async fn test_success_on_main_triggers_deployment() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";
        configure_repository(&stores, test_request(url, "true"))
            .await
            .unwrap();

        handle_webhook(&stores, test_event(url, "refs/heads/main", "success", "sha-1"))
            .await
            .unwrap();

        let deployment = wait_for_terminal_deployment(&stores)
            .await
            .expect("deployment record should reach a terminal state");
        assert_eq!(deployment.status, PipelineStatus::Success);
        assert!(deployment.finished_at.unwrap() >= deployment.started_at.unwrap());
    }

    #[tokio::test]
    async fn test_feature_branch_does_not_trigger_deployment() {
        let stores = Stores::memory();
        let url = "https://github.com/acme/api";
        configure_repository(&stores, test_request(url, "true"))
            .await
            .unwrap();

        handle_webhook(
            &stores,
            test_event(url, "refs/heads/feature-x", "success", "sha-1"),
        )
        .await
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        let records = stores.pipeline_records.list_recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r.author != "system"));
    }

    #[test]
    fn test_should_auto_deploy_gating() {
        let cases = [
            (PipelineStatus::Success, "refs/heads/main", "./deploy.sh", true),
            (PipelineStatus::Success, "main", "./deploy.sh", true),
            (PipelineStatus::Success, "refs/heads/feature-x", "./deploy.sh", false),
            (PipelineStatus::Success, "refs/heads/main", "", false),
            (PipelineStatus::Success, "main", "   ", false),
            (PipelineStatus::Failed, "refs/heads/main", "./deploy.sh", false),
            (PipelineStatus::Pending, "main", "./deploy.sh", false),
            (PipelineStatus::Running, "refs/heads/main", "./deploy.sh", false),
            (PipelineStatus::Canceled, "main", "./deploy.sh", false),
            (PipelineStatus::Failed, "refs/heads/feature-x", "", false),
        ];

        for (status, git_ref, action, expected) in cases {
            assert_eq!(
                should_auto_deploy(status, git_ref, action),
                expected,
                "({:?}, {:?}, {:?})",
                status,
                git_ref,
                action
            );
        }
    }
}
