//! Repository configuration domain types

use serde::{Deserialize, Serialize};

/// A repository watched for CI events
///
/// One configuration per repository URL. Credentials are write-only:
/// accepted on configuration requests, never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub id: i64,
    pub name: String,
    pub kind: RepoKind,
    pub repo_url: String,
    /// Shell command or script path run on auto/manual deployment.
    /// Empty means deployment is not configured for this repository.
    pub deploy_action: String,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    #[serde(skip_serializing, default)]
    pub webhook_secret: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Hosting platform of a configured repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    GitHub,
    GitLab,
}

impl RepoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RepoKind::GitHub => "github",
            RepoKind::GitLab => "gitlab",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "gitlab" => RepoKind::GitLab,
            _ => RepoKind::GitHub,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [RepoKind::GitHub, RepoKind::GitLab] {
            assert_eq!(RepoKind::from_db_str(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_credentials_never_serialized() {
        let config = RepoConfig {
            id: 1,
            name: "api".to_string(),
            kind: RepoKind::GitHub,
            repo_url: "https://github.com/acme/api".to_string(),
            deploy_action: "".to_string(),
            access_token: "token-123".to_string(),
            webhook_secret: "secret-456".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("token-123"));
        assert!(!json.contains("secret-456"));
    }
}
