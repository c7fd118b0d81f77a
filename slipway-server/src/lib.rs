//! Slipway Server
//!
//! CI event ingestion and deployment orchestration service:
//! - Repository configuration with generated webhook secrets
//! - Webhook normalization for GitHub and GitLab payloads
//! - Pipeline record persistence with idempotent delivery handling
//! - Trigger-gated background deployment execution

pub mod api;
pub mod config;
pub mod db;
pub mod normalizer;
pub mod service;
pub mod store;
