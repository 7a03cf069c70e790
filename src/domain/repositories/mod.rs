//! Repository trait definitions for the domain layer.
//!
//! The storage contract is defined here and implemented by the backends in
//! `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Testing
//!
//! See `tests/repository_pg.rs` and the unit tests of each backend.

pub mod url_repository;

pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
