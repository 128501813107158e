//! Chapter API Handlers
//!
//! HTTP endpoints that run a single chapter stage.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use blackbox_core::domain::request::GenerationRequest;
use blackbox_core::dto::chapter::{
    ChapterContentRequest, ChapterContentResponse, ChapterTitlesResponse,
};

use crate::api::error::ApiResult;
use crate::service::ebook_service;
use crate::state::AppState;

/// POST /api/v1/blackbox/generate-chapters-titles
pub async fn generate_chapter_titles(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<ChapterTitlesResponse>> {
    let Json(req) = payload?;
    tracing::info!("Generating chapter titles for '{}'", req.title);

    let response = ebook_service::generate_chapter_titles(&state, &req).await?;

    Ok(Json(response))
}

/// POST /api/v1/blackbox/generate-chapters-content
pub async fn generate_chapter_content(
    State(state): State<AppState>,
    payload: Result<Json<ChapterContentRequest>, JsonRejection>,
) -> ApiResult<Json<ChapterContentResponse>> {
    let Json(req) = payload?;
    tracing::info!(
        "Generating content for chapter '{}' of '{}'",
        req.chapter_title,
        req.ebook_title
    );

    let response = ebook_service::generate_chapter_content(&state, &req).await?;

    Ok(Json(response))
}
