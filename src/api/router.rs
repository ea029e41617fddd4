//! Route table for the diagnosis API.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::endpoints::{diagnosis, health};
use super::types::ApiContext;

/// Build the API router. `max_upload_bytes` sizes the body limit; the small
/// overhead on top covers multipart framing around the payload itself.
pub fn build_router(ctx: ApiContext, max_upload_bytes: u64) -> Router {
    let body_limit = max_upload_bytes as usize + 64 * 1024;

    Router::new()
        .route("/api/diagnosis/symptoms", post(diagnosis::analyze_symptoms))
        .route("/api/diagnosis/image", post(diagnosis::analyze_image))
        .route("/api/diagnosis/comprehensive", post(diagnosis::comprehensive))
        .route("/api/diagnosis/health", get(health::check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
