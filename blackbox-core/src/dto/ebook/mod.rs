//! E-book DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ebook::{DroppedChapter, PipelineResult};
use crate::domain::error::ErrorKind;

/// Generated content returned by the full e-book endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookData {
    pub introduction: String,
    pub chapter_titles: Vec<String>,
    pub chapters: Vec<String>,
}

/// Response of the full e-book endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookResponse {
    pub run_id: Uuid,
    pub data: EbookData,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<ErrorKind>,
    pub dropped_chapters: Vec<DroppedChapter>,
}

impl From<PipelineResult> for EbookResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            run_id: result.run_id,
            data: EbookData {
                introduction: result.document.introduction,
                chapter_titles: result.document.chapter_titles,
                chapters: result.document.chapters,
            },
            persisted: result.persisted,
            store_error: result.store_error,
            dropped_chapters: result.dropped_chapters,
        }
    }
}

/// Response of the introduction-only endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionResponse {
    pub introduction: String,
    /// Whether the introduction was stored in the introductions collection
    pub saved: bool,
}
