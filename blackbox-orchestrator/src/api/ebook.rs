//! E-book API Handlers
//!
//! HTTP endpoints for full e-book generation and standalone introductions.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use blackbox_core::domain::request::GenerationRequest;
use blackbox_core::dto::ebook::{EbookResponse, IntroductionResponse};

use crate::api::error::ApiResult;
use crate::service::ebook_service;
use crate::state::AppState;

/// POST /api/v1/blackbox/ebook
/// Generate introduction, chapter titles and chapter content, then persist
pub async fn generate_ebook(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<EbookResponse>> {
    let Json(req) = payload?;
    tracing::info!("Generating ebook '{}' for product {}", req.title, req.product_id);

    let response = ebook_service::generate_ebook(&state, &req).await?;

    Ok(Json(response))
}

/// POST /api/v1/blackbox/generate-introduction
pub async fn generate_introduction(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<IntroductionResponse>> {
    let Json(req) = payload?;
    tracing::info!("Generating introduction for product {}", req.product_id);

    let response = ebook_service::generate_introduction(&state, &req).await?;

    Ok(Json(response))
}
