//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The bank registry and the Saman (SEP) gateway routes
//! - Request-id, tracing and CORS middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod extractors;
pub mod registry;
pub mod routes;

use axum::{Router, http::HeaderName};
use irbankmock_shared::GatewayConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use registry::{BankPrefix, BankRegistry};

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Gateway settings used to build public URLs.
    pub gateway: Arc<GatewayConfig>,
}

/// Creates the main application router.
///
/// Banks are mounted from `registry`; anything unmatched is served from the
/// static web app directory.
pub fn create_router(state: AppState, registry: &BankRegistry) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let webapp = ServeDir::new(&state.gateway.webapp_path);

    registry
        .mount(Router::new().nest("/api", routes::api_routes()))
        .fallback_service(webapp)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(
                    |request: &axum::http::Request<axum::body::Body>| {
                        let request_id = request
                            .headers()
                            .get(REQUEST_ID_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    },
                ))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
