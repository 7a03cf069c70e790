//! HTTP middleware for request processing.
//!
//! Provides caller identification and observability middleware.

pub mod owner;
pub mod tracing;
