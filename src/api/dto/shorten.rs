//! DTOs for the single URL shortening endpoint.

use serde::{Deserialize, Serialize};

/// Request to shorten one URL.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

/// Rendered short URL, returned for both new and already-stored URLs.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}
