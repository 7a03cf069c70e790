//! Short code generation.
//!
//! Codes are drawn independently and uniformly from `[a-zA-Z0-9]`.
//! Uniqueness is not guaranteed here; backends reject colliding codes at
//! insert time and the shortening service retries with a fresh one.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Number of distinct symbols a code character can take.
pub const ALPHABET_SIZE: usize = 62;

/// Generates a random short code of exactly `length` characters.
///
/// Uses the thread-local generator, which is seeded from the operating
/// system on first use.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
