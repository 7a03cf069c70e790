//! URL repository backends.
//!
//! Concrete implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`MemoryUrlRepository`] - Process memory, lost on restart
//! - [`FileUrlRepository`] - Append-only JSON lines file
//! - [`PgUrlRepository`] - PostgreSQL via SQLx

pub mod file_url_repository;
pub mod memory_url_repository;
pub mod pg_url_repository;
mod url_table;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
