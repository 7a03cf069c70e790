//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without storage or transport concerns.
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - A stored short code → original URL mapping
//! - [`PendingUrl`] - A candidate code offered to a backend for insertion
//! - [`Resolution`] - Outcome of resolving a short code
//! - [`StoreStats`] - Global user and URL counters

pub mod url_record;

pub use url_record::{PendingUrl, Resolution, StoreStats, UrlRecord};
