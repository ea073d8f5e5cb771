//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the host presentation layer decoupled from storage details.

pub mod aggregation;
pub mod transcript;
pub mod transcript_service;
