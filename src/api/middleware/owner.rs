//! Caller identity middleware.
//!
//! The owner id is read from the `X-User-Id` request header. Requests without
//! one get a fresh UUID v4 identity, which is echoed back in the response's
//! `X-User-Id` header so the caller can reuse it. The header is trusted as-is;
//! signing and verification belong to an authentication layer in front.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

pub const OWNER_HEADER: &str = "x-user-id";

/// Identity of the caller of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    id: String,
    established: bool,
}

impl Owner {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when the caller presented an identity rather than getting a
    /// freshly minted one.
    pub fn is_established(&self) -> bool {
        self.established
    }

    /// Returns the owner id, or `401 Unauthorized` for a minted identity.
    ///
    /// A minted identity cannot own anything yet, so listing or deleting
    /// under it is refused.
    pub fn require_established(&self) -> Result<&str, AppError> {
        if self.established {
            Ok(&self.id)
        } else {
            Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "X-User-Id header is missing" }),
            ))
        }
    }

    fn from_header(value: Option<&HeaderValue>) -> Self {
        let supplied = value
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match supplied {
            Some(id) => Self {
                id: id.to_string(),
                established: true,
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                established: false,
            },
        }
    }
}

/// Resolves the caller identity and stores it in request extensions.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/user/urls", get(list_user_urls_handler))
///     .layer(middleware::from_fn(owner::layer));
/// ```
pub async fn layer(mut req: Request, next: Next) -> Response {
    let owner = Owner::from_header(req.headers().get(OWNER_HEADER));
    req.extensions_mut().insert(owner.clone());

    let mut response = next.run(req).await;

    if !owner.established
        && let Ok(value) = HeaderValue::from_str(&owner.id)
    {
        response.headers_mut().insert(OWNER_HEADER, value);
    }

    response
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Owner>().cloned().ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "caller identity is not available" }),
            )
        })
    }
}
