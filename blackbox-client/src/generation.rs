//! Text generation boundary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Marker the generation service uses to smuggle errors into completions
pub const ERROR_MARKER: &str = "ERR_";

/// Sampling options for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 512,
        }
    }
}

/// Maps a prompt to a completion
///
/// Implementations must be safe to call concurrently and safe to abandon:
/// dropping the returned future cancels the call without side effects.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates a completion for `prompt`
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String>;
}

/// Normalizes a raw completion, rejecting empty text and error payloads
///
/// Only a completion that starts with [`ERROR_MARKER`] is an error payload;
/// content that merely mentions an `ERR_` identifier passes.
pub fn check_completion(raw: &str) -> Result<String> {
    let text = raw.trim();

    if text.is_empty() {
        return Err(ClientError::EmptyCompletion);
    }

    if text.starts_with(ERROR_MARKER) {
        return Err(ClientError::ErrorPayload(text.to_string()));
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_completion_trims() {
        assert_eq!(check_completion("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_check_completion_rejects_empty() {
        assert!(matches!(
            check_completion(" \n\t"),
            Err(ClientError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_check_completion_rejects_error_marker() {
        assert!(matches!(
            check_completion("ERR_RATE_LIMITED"),
            Err(ClientError::ErrorPayload(_))
        ));
        assert!(matches!(
            check_completion("  ERR_CONTEXT_LENGTH: prompt too long"),
            Err(ClientError::ErrorPayload(_))
        ));
    }

    #[test]
    fn test_check_completion_allows_marker_inside_content() {
        let body = "When the socket fails you will see ERR_CONNECTION_REFUSED in the log.";
        assert_eq!(check_completion(body).unwrap(), body);
    }
}
