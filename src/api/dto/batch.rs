//! DTOs for batch shortening.
//!
//! The caller labels every item with an opaque `correlation_id` that is
//! echoed back next to the short URL.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BatchShortenItem {
    pub correlation_id: String,
    pub original_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}
