//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume the repository trait and
//! provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Single and batch shortening
//! - [`services::retrieval_service::RetrievalService`] - Lookup, listing and statistics
//! - [`services::deletion_service::DeletionService`] - Asynchronous soft deletion

pub mod services;
