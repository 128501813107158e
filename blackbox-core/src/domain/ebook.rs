//! E-book document and pipeline result types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::error::ErrorKind;
use crate::domain::request::GenerationRequest;

/// Format tag stored alongside every generated document
pub const EBOOK_FORMAT: &str = "ebook";

/// Pipeline stage, used to tag failures and dropped chapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Introduction,
    ChapterTitles,
    ChapterContent,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Introduction => "introduction",
            Stage::ChapterTitles => "chapter titles",
            Stage::ChapterContent => "chapter content",
        };
        f.write_str(name)
    }
}

/// The generated e-book
///
/// `chapter_titles[i]` is the title of `chapters[i]`. Both only contain
/// chapters that survived every stage, in original index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookDocument {
    pub title: String,
    pub niche: String,
    pub organization_id: String,
    pub product_id: String,
    pub format: String,
    pub introduction: String,
    pub chapter_titles: Vec<String>,
    pub chapters: Vec<String>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl EbookDocument {
    pub fn new(
        request: &GenerationRequest,
        introduction: String,
        chapter_titles: Vec<String>,
        chapters: Vec<String>,
    ) -> Self {
        Self {
            title: request.title.clone(),
            niche: request.niche.clone(),
            organization_id: request.organization_id.clone(),
            product_id: request.product_id.clone(),
            format: EBOOK_FORMAT.to_string(),
            introduction,
            chapter_titles,
            chapters,
            generated_at: chrono::Utc::now(),
        }
    }

    /// Field map handed to the document store (full-document overwrite)
    pub fn to_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // Struct with only string/vec/datetime fields always serializes to an object
            _ => serde_json::Map::new(),
        }
    }
}

/// A chapter that did not make it into the final document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedChapter {
    pub index: usize,
    pub stage: Stage,
    pub error: ErrorKind,
    /// Known when the title was generated but its content was not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Successful pipeline run
///
/// Persistence failure does not make the run fail: `persisted` is false and
/// `store_error` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub document: EbookDocument,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<ErrorKind>,
    pub dropped_chapters: Vec<DroppedChapter>,
}

impl PipelineResult {
    pub fn introduction(&self) -> &str {
        &self.document.introduction
    }

    pub fn chapters(&self) -> &[String] {
        &self.document.chapters
    }
}
