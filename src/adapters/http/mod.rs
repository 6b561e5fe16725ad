//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the full service: billing endpoints under `/api`,
//! a health check, bearer-token authentication and the tower-http stack.

pub mod billing;
pub mod middleware;

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use billing::{billing_routes, BillingApiError, BillingAppState};
pub use middleware::{auth_middleware, AuthState, RequireAuth};

// Gateway callbacks and checkout requests are a few hundred bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the application router.
pub fn app_router(state: BillingAppState, validator: AuthState, server: &ServerConfig) -> Router {
    let api = billing_routes()
        .with_state(state)
        .layer(from_fn_with_state(validator, auth_middleware));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(server))
                .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs))),
        )
}

async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
