//! OpenAI chat-completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::generation::{GenerationClient, GenerationOptions, check_completion};
use crate::handle_response;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Generation client backed by the OpenAI chat-completions API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// Base URL of the API (e.g., "https://api.openai.com/v1")
    base_url: String,
    api_key: String,
    model: String,
    /// HTTP client instance
    client: Client,
}

impl OpenAiClient {
    /// Create a client for the public API with the default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(api_key, Client::new())
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    /// Point the client at another API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use another chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(ClientError::InvalidRequest("prompt cannot be empty".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(
            "Sending completion request ({} prompt chars, max_tokens={})",
            prompt.len(),
            options.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let completion: ChatCompletionResponse = handle_response(response).await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ClientError::EmptyCompletion)?;

        check_completion(&content)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Option<(String, Value)>>>;

    async fn completion_handler(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *captured.lock().unwrap() = Some((auth, body));

        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  This is the text response.  " } }]
        }))
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OpenAiClient::new("key").with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.base_url(), "http://localhost:9000/v1");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_options() {
        let captured: Captured = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route("/chat/completions", post(completion_handler))
            .with_state(captured.clone());
        let base_url = spawn_server(router).await;

        let client = OpenAiClient::new("test-key")
            .with_base_url(base_url)
            .with_model("test-model");

        let text = client
            .generate("test-prompt", GenerationOptions::new(0.5, 10))
            .await
            .unwrap();
        assert_eq!(text, "This is the text response.");

        let (auth, body) = captured.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer test-key");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "test-prompt");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 10);
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let base_url = spawn_server(router).await;

        let client = OpenAiClient::new("test-key").with_base_url(base_url);
        let err = client
            .generate("test-prompt", GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_choices() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base_url = spawn_server(router).await;

        let client = OpenAiClient::new("test-key").with_base_url(base_url);
        let err = client
            .generate("test-prompt", GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt() {
        let client = OpenAiClient::new("test-key").with_base_url("http://127.0.0.1:1");
        let err = client
            .generate("  ", GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
