//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`              - Welcome message
//! - `GET  /favicon.ico`   - Empty 204
//! - `GET  /health`        - Store and ledger check
//! - `GET  /url/{id}`      - Short link redirect (public)
//! - `POST /post-url`      - Link creation (paced)
//! - `/urls`, `/verify/{id}`, `/delete/{id}`, `/sync-counter` - Admin (paced, admin key)
//!
//! Anything else answers 404 "Invalid endpoint".
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, `POST` and `OPTIONS`, `Content-Type` header
//! - **Pacing** - One request per client per interval, before authentication
//! - **Authentication** - Admin key (Bearer or `x-api-key`)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{
    fallback_handler, favicon_handler, health_handler, redirect_handler, root_handler,
};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Router, middleware};
use std::time::Duration;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Constructs the application router with trailing-slash normalization.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}

/// All routes and middleware, without path normalization.
pub fn build_router(state: AppState) -> Router {
    let admin_router = api::routes::admin_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    let public_router = api::routes::public_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), rate_limit::layer),
    );

    Router::new()
        .route("/", get(root_handler))
        .route("/favicon.ico", get(favicon_handler))
        .route("/health", get(health_handler))
        .route("/url/{id}", get(redirect_handler))
        .merge(public_router)
        .merge(admin_router)
        .fallback(fallback_handler)
        .method_not_allowed_fallback(fallback_handler)
        .with_state(state)
        .layer(cors_layer())
        .layer(tracing::layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(CORS_MAX_AGE)
}
