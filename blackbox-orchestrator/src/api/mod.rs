//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod chapter;
pub mod ebook;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // E-book endpoints
        .route("/api/v1/blackbox/ebook", post(ebook::generate_ebook))
        .route(
            "/api/v1/blackbox/generate-introduction",
            post(ebook::generate_introduction),
        )
        // Chapter endpoints
        .route(
            "/api/v1/blackbox/generate-chapters-titles",
            post(chapter::generate_chapter_titles),
        )
        .route(
            "/api/v1/blackbox/generate-chapters-content",
            post(chapter::generate_chapter_content),
        )
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
