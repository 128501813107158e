//! Prompt builders and completion cleanup
//!
//! Prompts are a pure function of the request and the task index, so the
//! same request always produces the same batch of tasks.

use blackbox_client::check_completion;
use blackbox_core::domain::error::ErrorKind;
use blackbox_core::domain::request::GenerationRequest;

use crate::error::generation_error;

pub fn introduction(request: &GenerationRequest) -> String {
    format!(
        "Write a short introduction for an ebook about {} in the {} niche, using correct grammar and engaging words.",
        request.title, request.niche
    )
}

/// Prompt for the title of chapter `index` (zero-based) out of `count`
pub fn chapter_title(request: &GenerationRequest, index: usize, count: usize) -> String {
    format!(
        "A student wants to learn about {} ({}) through a course of {} modules. Reply with only the title of module {}, without numbering or quotes.",
        request.title,
        request.niche,
        count,
        index + 1
    )
}

pub fn chapter_content(ebook_title: &str, ebook_niche: &str, chapter_title: &str) -> String {
    format!(
        "Teach a student about the topic and sub-topic below, writing several paragraphs. The topic is: {} and the sub-topic is: {} and the chapter name is: {}",
        ebook_title, ebook_niche, chapter_title
    )
}

/// Reduces a title completion to a bare chapter title
///
/// Keeps the first non-empty line, strips a leading enumeration such as
/// `3.`, `3)` or `3 -`, and surrounding quotes.
pub fn clean_title(raw: &str) -> Result<String, ErrorKind> {
    let checked = check_completion(raw).map_err(generation_error)?;
    let line = checked
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let title = strip_enumeration(line)
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '*'))
        .trim();

    if title.is_empty() {
        return Err(ErrorKind::upstream("completion did not contain a chapter title"));
    }

    Ok(title.to_string())
}

/// Cleanup for chapter bodies and the introduction
pub fn clean_content(raw: &str) -> Result<String, ErrorKind> {
    check_completion(raw).map_err(generation_error)
}

fn strip_enumeration(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }

    let rest = rest.trim_start();
    let Some(after) = rest.strip_prefix(['.', ')', '-']) else {
        return line;
    };

    // "3-D Printing" and "3.5 Million" are titles, "3. Intro" is a list item
    match after.chars().next() {
        None => after,
        Some(c) if c.is_whitespace() => after.trim_start(),
        Some(_) => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new("Go Basics", "programming", "org1", "p1")
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let req = request();
        assert_eq!(introduction(&req), introduction(&req));
        assert_eq!(chapter_title(&req, 2, 10), chapter_title(&req, 2, 10));
        assert_ne!(chapter_title(&req, 2, 10), chapter_title(&req, 3, 10));
    }

    #[test]
    fn test_prompts_mention_request_fields() {
        let req = request();
        let prompt = introduction(&req);
        assert!(prompt.contains("Go Basics"));
        assert!(prompt.contains("programming"));

        let prompt = chapter_title(&req, 0, 10);
        assert!(prompt.contains("module 1"));
        assert!(prompt.contains("10 modules"));

        let prompt = chapter_content("Go Basics", "programming", "Goroutines");
        assert!(prompt.ends_with("the chapter name is: Goroutines"));
    }

    #[test]
    fn test_clean_title_strips_noise() {
        assert_eq!(clean_title("  \"Getting Started\"  ").unwrap(), "Getting Started");
        assert_eq!(clean_title("3. Concurrency").unwrap(), "Concurrency");
        assert_eq!(clean_title("4) Channels").unwrap(), "Channels");
        assert_eq!(clean_title("10 - Testing").unwrap(), "Testing");
        assert_eq!(clean_title("\n\nModules\nextra text").unwrap(), "Modules");
    }

    #[test]
    fn test_clean_title_keeps_leading_numbers_that_are_not_enumeration() {
        assert_eq!(clean_title("2001: A Go Odyssey").unwrap(), "2001: A Go Odyssey");
        assert_eq!(clean_title("OUT:prompt").unwrap(), "OUT:prompt");
        assert_eq!(
            clean_title("3-D Printing for Makers").unwrap(),
            "3-D Printing for Makers"
        );
        assert_eq!(clean_title("24-Hour Study Plan").unwrap(), "24-Hour Study Plan");
        assert_eq!(clean_title("3.5 Million Users").unwrap(), "3.5 Million Users");
    }

    #[test]
    fn test_clean_title_rejects_empty_and_error_payloads() {
        assert!(matches!(clean_title("   "), Err(ErrorKind::Upstream(_))));
        assert!(matches!(clean_title("\"\""), Err(ErrorKind::Upstream(_))));
        assert!(matches!(clean_title("7."), Err(ErrorKind::Upstream(_))));
        assert!(matches!(
            clean_title("ERR_CONTEXT_LENGTH"),
            Err(ErrorKind::Upstream(_))
        ));
    }

    #[test]
    fn test_clean_content() {
        assert_eq!(clean_content(" body ").unwrap(), "body");
        assert!(clean_content("").is_err());
    }
}
