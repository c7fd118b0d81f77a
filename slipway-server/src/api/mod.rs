//! HTTP API Layer
//!
//! Route definitions, shared application state, authentication, and
//! error-to-response conversion.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::store::Stores;

pub mod auth;
pub mod config;
pub mod deploy;
pub mod error;
pub mod health;
pub mod summary;
pub mod webhook;

/// Shared state available to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub stores: Stores,
}

/// Build the application router
pub fn create_router(config: AppConfig, stores: Stores) -> Router {
    let state = AppState { config, stores };

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/devops/config", post(config::configure_repo))
        .route("/api/v1/devops/config/{id}", delete(config::delete_repo))
        .route("/api/v1/devops/summary", get(summary::get_summary))
        .route(
            "/api/v1/devops/webhooks/{platform}",
            post(webhook::receive_webhook),
        )
        .route("/api/v1/devops/deploy/{id}", post(deploy::trigger_deploy))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
