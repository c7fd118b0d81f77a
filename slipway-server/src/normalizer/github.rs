//! GitHub webhook normalizer
//!
//! Accepts `push` and `workflow_run` payloads. Push deliveries carry no
//! status of their own and default to "success"; workflow runs map their
//! conclusion (or in-flight status) through.

use serde::Deserialize;
use slipway_core::dto::webhook::WebhookEvent;

use super::NormalizeError;

/// Normalize a GitHub webhook payload into a canonical event
pub fn normalize(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    if value.get("workflow_run").is_some() {
        normalize_workflow_run(value)
    } else {
        normalize_push(value)
    }
}

fn normalize_push(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    let payload: PushPayload = serde_json::from_value(value)
        .map_err(|e| NormalizeError::MalformedPayload(format!("invalid push payload: {}", e)))?;

    if payload.repository.html_url.is_empty() || payload.head_commit.id.is_empty() {
        return Err(NormalizeError::MalformedPayload(
            "push payload missing repository url or commit id".to_string(),
        ));
    }

    Ok(WebhookEvent {
        event_kind: "push".to_string(),
        repo_url: payload.repository.html_url,
        git_ref: payload.git_ref,
        commit_sha: payload.head_commit.id,
        commit_msg: payload.head_commit.message,
        author: payload.head_commit.author.name,
        status: "success".to_string(),
    })
}

fn normalize_workflow_run(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    let payload: WorkflowRunPayload = serde_json::from_value(value).map_err(|e| {
        NormalizeError::MalformedPayload(format!("invalid workflow_run payload: {}", e))
    })?;

    let run = payload.workflow_run;

    if payload.repository.html_url.is_empty() || run.head_sha.is_empty() {
        return Err(NormalizeError::MalformedPayload(
            "workflow_run payload missing repository url or commit id".to_string(),
        ));
    }

    // GitHub spells terminal states its own way; fold them onto the
    // canonical vocabulary before they reach status mapping.
    let status = match run.conclusion.as_deref() {
        Some("cancelled") => "canceled",
        Some(conclusion) => conclusion,
        None => match run.status.as_deref() {
            Some("in_progress") => "running",
            Some(status) => status,
            None => "",
        },
    }
    .to_string();

    Ok(WebhookEvent {
        event_kind: "workflow_run".to_string(),
        repo_url: payload.repository.html_url,
        git_ref: run.head_branch.unwrap_or_default(),
        commit_sha: run.head_sha,
        commit_msg: run.display_title.unwrap_or_default(),
        author: run.actor.map(|a| a.login).unwrap_or_default(),
        status,
    })
}

// =============================================================================
// Payload Shapes
// =============================================================================

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    head_commit: HeadCommit,
    repository: Repository,
}

#[derive(Deserialize)]
struct HeadCommit {
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: CommitAuthor,
}

#[derive(Deserialize, Default)]
struct CommitAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct Repository {
    html_url: String,
}

#[derive(Deserialize)]
struct WorkflowRunPayload {
    workflow_run: WorkflowRun,
    repository: Repository,
}

#[derive(Deserialize)]
struct WorkflowRun {
    head_branch: Option<String>,
    head_sha: String,
    status: Option<String>,
    conclusion: Option<String>,
    display_title: Option<String>,
    actor: Option<Actor>,
}

#[derive(Deserialize)]
struct Actor {
    login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_payload() {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "head_commit": {
                "id": "abc123",
                "message": "fix login flow",
                "author": { "name": "alice" }
            },
            "repository": { "html_url": "https://github.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.event_kind, "push");
        assert_eq!(event.repo_url, "https://github.com/acme/api");
        assert_eq!(event.git_ref, "refs/heads/main");
        assert_eq!(event.commit_sha, "abc123");
        assert_eq!(event.author, "alice");
        assert_eq!(event.status, "success");
    }

    #[test]
    fn test_workflow_run_conclusion() {
        let payload = serde_json::json!({
            "workflow_run": {
                "head_branch": "main",
                "head_sha": "def456",
                "status": "completed",
                "conclusion": "failure",
                "display_title": "CI",
                "actor": { "login": "bob" }
            },
            "repository": { "html_url": "https://github.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.event_kind, "workflow_run");
        assert_eq!(event.status, "failure");
        assert_eq!(event.git_ref, "main");
        assert_eq!(event.author, "bob");
    }

    #[test]
    fn test_workflow_run_cancelled_spelling() {
        let payload = serde_json::json!({
            "workflow_run": {
                "head_sha": "def456",
                "status": "completed",
                "conclusion": "cancelled"
            },
            "repository": { "html_url": "https://github.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.status, "canceled");
    }

    #[test]
    fn test_workflow_run_in_progress() {
        let payload = serde_json::json!({
            "workflow_run": {
                "head_sha": "def456",
                "status": "in_progress",
                "conclusion": null
            },
            "repository": { "html_url": "https://github.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.status, "running");
    }

    #[test]
    fn test_missing_repository_is_malformed() {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "head_commit": { "id": "abc123" }
        });

        let result = normalize(payload);
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }

    #[test]
    fn test_empty_commit_id_is_malformed() {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "head_commit": { "id": "" },
            "repository": { "html_url": "https://github.com/acme/api" }
        });

        let result = normalize(payload);
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }
}
