//! Bearer session authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it through the
//! identity gateway, and injects `CallerContext` into request
//! extensions for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};

/// Require a valid session token.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer). On success: injects `CallerContext`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let user = ctx
        .identity
        .resolve_session(&token)?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CallerContext { user });

    Ok(next.run(req).await)
}
