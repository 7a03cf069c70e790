//! Validation of URLs submitted for shortening.
//!
//! URLs are checked, not rewritten: the submitted string is what gets
//! stored and what deduplication keys on.

use url::Url;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Checks that `input` is an absolute URL with a scheme and a non-empty host.
///
/// # Errors
///
/// Returns [`UrlValidationError::Empty`] for blank input,
/// [`UrlValidationError::InvalidFormat`] when the string does not parse as an
/// absolute URL and [`UrlValidationError::MissingHost`] for host-less URLs
/// such as `mailto:` or `data:`.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("http://example.com").is_ok());
/// assert!(validate_url("not-a-url").is_err());
/// assert!(validate_url("mailto:someone@example.com").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
