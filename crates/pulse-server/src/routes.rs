//! HTTP route handlers, one module per endpoint.

pub mod device;
pub mod heat;
pub mod health;
pub mod ingest;
pub mod stats;
pub mod vibe;

use axum::routing::{get, post};
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/device/register", post(device::register))
        .route("/ingest", post(ingest::ingest))
        .route("/heat", get(heat::heat))
        .route("/stats", get(stats::stats))
        .route("/vibe", post(vibe::vibe))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
