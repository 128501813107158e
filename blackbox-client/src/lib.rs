//! Blackbox vendor clients
//!
//! The e-book pipeline talks to two external collaborators: a text
//! generation service and a document store. This crate defines the traits
//! the pipeline depends on and the HTTP implementations used in production.
//!
//! Implementations are constructed explicitly and handed to the pipeline,
//! so tests can substitute deterministic stubs.
//!
//! # Example
//!
//! ```no_run
//! use blackbox_client::{GenerationClient, GenerationOptions, OpenAiClient};
//!
//! # async fn example() -> blackbox_client::Result<()> {
//! let client = OpenAiClient::new("sk-...");
//! let text = client
//!     .generate("Write a haiku about Rust", GenerationOptions::default())
//!     .await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod firestore;
mod generation;
mod openai;
mod store;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use firestore::FirestoreStore;
pub use generation::{ERROR_MARKER, GenerationClient, GenerationOptions, check_completion};
pub use openai::OpenAiClient;
pub use store::{DocumentStore, Fields, InMemoryDocumentStore};

use serde::de::DeserializeOwned;

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an appropriate error if the request
/// failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response whose body is not needed
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(())
}
