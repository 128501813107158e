//! Error taxonomy shared by tasks, stages and the HTTP layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a unit of work (or a whole stage) failed
///
/// Serialized as `{"kind": "...", "detail": ...}` so it can be embedded
/// directly in HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The generation call failed or returned an error payload
    #[error("upstream generation failed: {0}")]
    Upstream(String),

    /// The deadline elapsed before the task completed
    #[error("deadline elapsed before the task completed")]
    Timeout,

    /// Every task of a phase failed
    #[error("all {failed} tasks failed")]
    AllTasksFailed { failed: usize },

    /// Persisting the document failed
    #[error("document store error: {0}")]
    Store(String),

    /// The request was rejected before any network call
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ErrorKind {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
