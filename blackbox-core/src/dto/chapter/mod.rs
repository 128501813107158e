//! Chapter DTOs

use serde::{Deserialize, Serialize};

use crate::domain::ebook::DroppedChapter;
use crate::domain::error::ErrorKind;

/// A generated chapter title; `number` is one-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterTitle {
    pub number: usize,
    pub title: String,
}

/// Response of the chapter-titles endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterTitlesResponse {
    pub chapters: Vec<ChapterTitle>,
    pub dropped: Vec<DroppedChapter>,
}

/// Request to expand one chapter title into content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContentRequest {
    pub chapter_title: String,
    pub ebook_title: String,
    pub ebook_niche: String,
}

impl ChapterContentRequest {
    pub fn validate(&self) -> Result<(), ErrorKind> {
        let fields = [
            ("chapterTitle", &self.chapter_title),
            ("ebookTitle", &self.ebook_title),
            ("ebookNiche", &self.ebook_niche),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ErrorKind::invalid_input(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

/// Response of the chapter-content endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContentResponse {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_request_validation() {
        let req: ChapterContentRequest = serde_json::from_str(
            r#"{"chapterTitle":"Goroutines","ebookTitle":"Go Basics","ebookNiche":"programming"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let req = ChapterContentRequest {
            chapter_title: " ".to_string(),
            ..req
        };
        assert!(matches!(req.validate(), Err(ErrorKind::InvalidInput(_))));
    }
}
