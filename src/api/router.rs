//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Routes are nested under `/api/`; everything except the
//! health check sits behind the session middleware.

use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (provided via
/// `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::book),
        )
        .route(
            "/appointments/:id",
            patch(endpoints::appointments::set_status),
        )
        .route(
            "/messages",
            get(endpoints::messages::inbox).post(endpoints::messages::send),
        )
        .route("/messages/:id", patch(endpoints::messages::set_flags))
        .route("/consultations", get(endpoints::consultations::list))
        .route(
            "/patient-profile",
            get(endpoints::profile::get).patch(endpoints::profile::update),
        )
        .route("/doctors", get(endpoints::doctors::list))
        .route("/patients", get(endpoints::patients::list))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new().route("/health", get(endpoints::health::check));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
}
