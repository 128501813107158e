//! E-book Service
//!
//! Runs the pipeline (or one of its stages) for a request.

use blackbox_client::Fields;
use blackbox_core::domain::request::GenerationRequest;
use blackbox_core::dto::chapter::{
    ChapterContentRequest, ChapterContentResponse, ChapterTitle, ChapterTitlesResponse,
};
use blackbox_core::dto::ebook::{EbookResponse, IntroductionResponse};
use blackbox_runner::PipelineError;
use serde_json::Value;

use crate::state::AppState;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Generate a complete e-book
pub async fn generate_ebook(state: &AppState, req: &GenerationRequest) -> Result<EbookResponse> {
    let result = state.pipeline.run(req).await?;

    if !result.dropped_chapters.is_empty() {
        tracing::warn!(
            "Run {} dropped {} chapter(s)",
            result.run_id,
            result.dropped_chapters.len()
        );
    }

    Ok(result.into())
}

/// Generate an introduction and save it under the product id
///
/// A failed save is reported through `saved` and never fails the request.
pub async fn generate_introduction(
    state: &AppState,
    req: &GenerationRequest,
) -> Result<IntroductionResponse> {
    let introduction = state.pipeline.introduction(req).await?;

    let mut fields = Fields::new();
    fields.insert("productId".to_string(), Value::from(req.product_id.as_str()));
    fields.insert("introduction".to_string(), Value::from(introduction.as_str()));

    let saved = match state
        .store
        .upsert(&state.introductions_collection, &req.product_id, fields)
        .await
    {
        Ok(()) => {
            tracing::info!("Introduction saved for product {}", req.product_id);
            true
        }
        Err(e) => {
            tracing::warn!(
                "Failed to save introduction for product {}: {}",
                req.product_id,
                e
            );
            false
        }
    };

    Ok(IntroductionResponse {
        introduction,
        saved,
    })
}

/// Generate chapter titles, numbered from one
pub async fn generate_chapter_titles(
    state: &AppState,
    req: &GenerationRequest,
) -> Result<ChapterTitlesResponse> {
    let titles = state.pipeline.chapter_titles(req).await?;

    let chapters = titles
        .items
        .into_iter()
        .map(|(index, title)| ChapterTitle {
            number: index + 1,
            title,
        })
        .collect();

    Ok(ChapterTitlesResponse {
        chapters,
        dropped: titles.dropped,
    })
}

/// Generate the content of one chapter
pub async fn generate_chapter_content(
    state: &AppState,
    req: &ChapterContentRequest,
) -> Result<ChapterContentResponse> {
    let content = state.pipeline.chapter_content(req).await?;
    Ok(ChapterContentResponse { content })
}
