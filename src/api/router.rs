use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, security_headers_middleware, MAX_BODY_SIZE,
};
use super::products;
use super::state::AppState;
use crate::config::ServerConfig;

/// Create the full router with application state
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api/auth", auth::create_auth_router())
        .nest("/api/product", products::create_product_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(cors_layer(server.cors_allow_any_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allow_any_origin: bool) -> CorsLayer {
    if allow_any_origin {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    }
}
