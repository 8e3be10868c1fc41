//! Scrape endpoint for the exporter.
//!
//! Serves the configured metrics path plus a liveness probe. Each scrape
//! triggers one collection cycle synchronously before the registry is
//! encoded, serialized so no scraper observes a partially-reset metric set.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::collector::BackrestCollector;

/// Shared application state.
pub struct AppState {
    pub collector: BackrestCollector,
    pub registry: Registry,
    /// Serializes reset-then-populate against concurrent scrapes.
    pub collect_lock: Mutex<()>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Create the Axum router with the metrics path from the exporter config.
pub fn create_router(state: Arc<AppState>, metrics_path: &str) -> Router {
    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Scrape handler. Runs one collection cycle, then encodes the registry.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let _guard = state.collect_lock.lock().await;

    // Abort paths have already logged; stale values stay published.
    let _ = state.collector.collect().await;

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&state.registry.gather(), &mut buffer) {
        Ok(()) => (
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Metric encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
