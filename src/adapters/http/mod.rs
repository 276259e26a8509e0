//! HTTP adapter - REST API over the run coordinator.

pub mod threads;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::RunCoordinator;
use crate::config::ServerConfig;

pub use threads::{thread_routes, ThreadHandlers};

/// Builds the application router with tracing, CORS and request timeout layers.
pub fn app_router(coordinator: Arc<RunCoordinator>, server: &ServerConfig) -> Router {
    thread_routes(ThreadHandlers::new(coordinator))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        tracing::warn!("CORS: allowing all origins; set server.cors_origins to restrict");
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    cors.allow_origin(AllowOrigin::list(allowed))
}
