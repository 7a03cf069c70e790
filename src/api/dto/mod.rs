//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization.

pub mod batch;
pub mod shorten;
pub mod stats;
pub mod user_urls;
