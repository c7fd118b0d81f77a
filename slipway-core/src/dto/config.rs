//! Repository configuration DTOs

use serde::{Deserialize, Serialize};

use crate::domain::repo_config::{RepoConfig, RepoKind};

/// Request to create or update a repository configuration
///
/// An empty `access_token` on update leaves the stored token untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureRepoRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub kind: RepoKind,
    pub repo_url: String,
    #[serde(default)]
    pub deploy_action: String,
    #[serde(default)]
    pub access_token: String,
}

/// Public-safe projection of a repository configuration
///
/// The only configuration shape the API returns. Never carries the access
/// token or the webhook secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfigView {
    pub id: i64,
    pub name: String,
    pub kind: RepoKind,
    pub repo_url: String,
    pub deploy_action: String,
}

impl From<RepoConfig> for RepoConfigView {
    fn from(config: RepoConfig) -> Self {
        RepoConfigView {
            id: config.id,
            name: config.name,
            kind: config.kind,
            repo_url: config.repo_url,
            deploy_action: config.deploy_action,
        }
    }
}
