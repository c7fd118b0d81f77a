//! Webhook normalizers
//!
//! One module per hosting platform. Each normalizer turns the platform's raw
//! JSON payload into the canonical [`WebhookEvent`](slipway_core::dto::webhook::WebhookEvent)
//! without touching storage; adding a platform means adding a module here.

pub mod github;
pub mod gitlab;

/// Normalizer error type
#[derive(Debug)]
pub enum NormalizeError {
    /// The payload is missing required fields or is not a recognized shape.
    MalformedPayload(String),
}
