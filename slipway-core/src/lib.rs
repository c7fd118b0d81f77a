//! Slipway Core
//!
//! Core types for the Slipway CI event ingestion and deployment service.
//!
//! This crate contains:
//! - Domain types: Core business entities (RepoConfig, PipelineRecord)
//! - DTOs: Request/response shapes and the canonical webhook event

pub mod domain;
pub mod dto;
