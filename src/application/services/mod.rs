//! Business logic services for the application layer.

pub mod deletion_service;
pub mod error;
pub mod retrieval_service;
pub mod shorten_service;

pub use deletion_service::DeletionService;
pub use error::ServiceError;
pub use retrieval_service::RetrievalService;
pub use shorten_service::{ShortenOutcome, ShortenService};
