//! Domain layer containing business entities and logic.
//!
//! This module defines entities, the storage contract and the deletion
//! pipeline independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`errors`] - Storage error taxonomy and deadline helper
//! - [`deletion_task`] - Soft-deletion request model
//! - [`deletion_worker`] - Bounded deletion queue and worker pool
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on the presentation layer
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Deletion Flow
//!
//! 1. Caller submits codes via [`crate::application::services::DeletionService`]
//! 2. [`deletion_task::DeletionTask`] is sent to the bounded channel
//! 3. A [`deletion_worker`] worker dequeues it
//! 4. The soft delete is applied via [`repositories::UrlRepository::batch_delete`]

pub mod deletion_task;
pub mod deletion_worker;
pub mod entities;
pub mod errors;
pub mod repositories;
