use axum::{
    body::Body,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// The raw bearer token of the current request.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

/// Extracts the bearer token from the `Authorization` header.
///
/// # Arguments
///
/// * `request` - The incoming request.
///
/// # Returns
///
/// An `Option` containing the token if present and non-empty.
fn extract_bearer_token(request: &Request<Body>) -> Option<String> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// A middleware that requires a bearer token to be present.
///
/// The token is only checked for presence here; the swipe engine validates it
/// against the auth service.
pub async fn require_bearer(mut request: Request<Body>, next: Next) -> Response {
    tracing::debug!("🔐 Checking bearer token...");

    let Some(token) = extract_bearer_token(&request) else {
        tracing::warn!("❌ No bearer token found");
        return AppError::Unauthorized.into_response();
    };

    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}
