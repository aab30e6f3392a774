//! Session authentication middleware.
//!
//! Resolves the `Authorization: Bearer <session_token>` header against the
//! session registry and makes the [`SessionContext`] available to handlers.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::crypto::token_fingerprint;

use crate::app::AppState;
use crate::error::ApiError;

/// Middleware that rejects requests without a live session.
///
/// On success the [`crate::services::SessionContext`] is inserted into the
/// request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return ApiError::Unauthorized("Missing or invalid Authorization header".into())
            .into_response();
    };

    match state.sessions.resolve(token).await {
        Some(session) => {
            tracing::debug!(
                session = %token_fingerprint(token),
                username = %session.user.username,
                "Session resolved"
            );
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            tracing::debug!(session = %token_fingerprint(token), "Unknown or expired session");
            ApiError::Unauthorized("Invalid or expired session".into()).into_response()
        }
    }
}

/// Extracts a non-empty bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
