//! GitLab webhook normalizer
//!
//! Accepts push hooks and pipeline hooks, distinguished by `object_kind`.
//! Pipeline hooks carry an explicit status; push hooks default to "success".

use serde::Deserialize;
use slipway_core::dto::webhook::WebhookEvent;

use super::NormalizeError;

/// Normalize a GitLab webhook payload into a canonical event
pub fn normalize(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    let object_kind = value
        .get("object_kind")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    match object_kind.as_str() {
        "push" => normalize_push(value),
        "pipeline" => normalize_pipeline(value),
        other => Err(NormalizeError::MalformedPayload(format!(
            "unsupported gitlab object_kind: {:?}",
            other
        ))),
    }
}

fn normalize_push(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    let payload: PushHook = serde_json::from_value(value)
        .map_err(|e| NormalizeError::MalformedPayload(format!("invalid push hook: {}", e)))?;

    let commit_sha = payload.checkout_sha.unwrap_or_default();
    if payload.project.web_url.is_empty() || commit_sha.is_empty() {
        return Err(NormalizeError::MalformedPayload(
            "push hook missing project url or checkout sha".to_string(),
        ));
    }

    // The hook lists every pushed commit; the head commit describes the push.
    let head_commit = payload.commits.into_iter().last();
    let (commit_msg, commit_author) = match head_commit {
        Some(commit) => (commit.message, commit.author.name),
        None => (String::new(), String::new()),
    };

    let author = if commit_author.is_empty() {
        payload.user_name
    } else {
        commit_author
    };

    Ok(WebhookEvent {
        event_kind: "push".to_string(),
        repo_url: payload.project.web_url,
        git_ref: payload.git_ref,
        commit_sha,
        commit_msg,
        author,
        status: "success".to_string(),
    })
}

fn normalize_pipeline(value: serde_json::Value) -> Result<WebhookEvent, NormalizeError> {
    let payload: PipelineHook = serde_json::from_value(value)
        .map_err(|e| NormalizeError::MalformedPayload(format!("invalid pipeline hook: {}", e)))?;

    let attrs = payload.object_attributes;
    if payload.project.web_url.is_empty() || attrs.sha.is_empty() {
        return Err(NormalizeError::MalformedPayload(
            "pipeline hook missing project url or sha".to_string(),
        ));
    }

    let (commit_msg, author) = match payload.commit {
        Some(commit) => (commit.message, commit.author.name),
        None => (String::new(), String::new()),
    };

    Ok(WebhookEvent {
        event_kind: "pipeline".to_string(),
        repo_url: payload.project.web_url,
        git_ref: attrs.git_ref.unwrap_or_default(),
        commit_sha: attrs.sha,
        commit_msg,
        author,
        status: attrs.status.unwrap_or_default(),
    })
}

// =============================================================================
// Payload Shapes
// =============================================================================

#[derive(Deserialize)]
struct PushHook {
    #[serde(rename = "ref")]
    git_ref: String,
    checkout_sha: Option<String>,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    commits: Vec<HookCommit>,
    project: Project,
}

#[derive(Deserialize)]
struct HookCommit {
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: HookAuthor,
}

#[derive(Deserialize, Default)]
struct HookAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct Project {
    web_url: String,
}

#[derive(Deserialize)]
struct PipelineHook {
    object_attributes: PipelineAttributes,
    commit: Option<HookCommit>,
    project: Project,
}

#[derive(Deserialize)]
struct PipelineAttributes {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    sha: String,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_hook() {
        let payload = serde_json::json!({
            "object_kind": "push",
            "ref": "refs/heads/main",
            "checkout_sha": "abc123",
            "user_name": "alice",
            "commits": [
                { "message": "older commit", "author": { "name": "carol" } },
                { "message": "add healthcheck", "author": { "name": "bob" } }
            ],
            "project": { "web_url": "https://gitlab.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.event_kind, "push");
        assert_eq!(event.repo_url, "https://gitlab.com/acme/api");
        assert_eq!(event.commit_sha, "abc123");
        assert_eq!(event.commit_msg, "add healthcheck");
        assert_eq!(event.author, "bob");
        assert_eq!(event.status, "success");
    }

    #[test]
    fn test_pipeline_hook_carries_status() {
        let payload = serde_json::json!({
            "object_kind": "pipeline",
            "object_attributes": {
                "ref": "main",
                "sha": "def456",
                "status": "failed"
            },
            "commit": {
                "message": "break the build",
                "author": { "name": "mallory" }
            },
            "project": { "web_url": "https://gitlab.com/acme/api" }
        });

        let event = normalize(payload).unwrap();
        assert_eq!(event.event_kind, "pipeline");
        assert_eq!(event.status, "failed");
        assert_eq!(event.git_ref, "main");
        assert_eq!(event.author, "mallory");
    }

    #[test]
    fn test_unknown_object_kind_is_malformed() {
        let payload = serde_json::json!({
            "object_kind": "merge_request",
            "project": { "web_url": "https://gitlab.com/acme/api" }
        });

        let result = normalize(payload);
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }

    #[test]
    fn test_push_without_checkout_sha_is_malformed() {
        let payload = serde_json::json!({
            "object_kind": "push",
            "ref": "refs/heads/main",
            "checkout_sha": null,
            "commits": [],
            "project": { "web_url": "https://gitlab.com/acme/api" }
        });

        let result = normalize(payload);
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }
}
