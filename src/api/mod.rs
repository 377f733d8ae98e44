//! API layer - HTTP handlers and routing
//!
//! This module contains the HTTP surface of the Newsdesk backend:
//! - Admin endpoints for moderation, identity lifecycle and metrics
//! - Gateway-trust middleware (authentication happens upstream)
//! - Shared response envelopes

pub mod admin;
pub mod middleware;
pub mod responses;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, GatewayActor, ACTOR_ROLE_HEADER};

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let router = Router::new()
        .nest("/api/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
