//! Bearer token authentication
//!
//! Validates HS256-signed JWTs issued by the external identity provider.
//! This service only consumes identities; it never issues tokens.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Decode and verify a bearer token against the shared secret
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Authenticated caller extracted from the Authorization header
#[derive(Debug)]
pub struct Identity {
    pub subject: String,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".to_string())
        })?;

        let claims = validate_token(token, &state.config.jwt_secret)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Identity {
            subject: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::Stores;
    use axum::http::Request;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn test_state() -> AppState {
        AppState {
            config: AppConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                database_url: "postgres://localhost/test".to_string(),
                jwt_secret: SECRET.to_string(),
            },
            stores: Stores::memory(),
        }
    }

    fn make_token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: "alice".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn test_valid_token_accepted() {
        let token = make_token(SECRET, future_exp());
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let identity = Identity::from_request_parts(&mut parts, &test_state())
            .await
            .unwrap();
        assert_eq!(identity.subject, "alice");
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let mut parts = parts_with_auth(None);

        let result = Identity::from_request_parts(&mut parts, &test_state()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_wrong_scheme_rejected() {
        let mut parts = parts_with_auth(Some("Basic abc123"));

        let result = Identity::from_request_parts(&mut parts, &test_state()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = make_token(SECRET, chrono::Utc::now().timestamp() - 3600);
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let result = Identity::from_request_parts(&mut parts, &test_state()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = make_token("other-secret", future_exp());
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let result = Identity::from_request_parts(&mut parts, &test_state()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
