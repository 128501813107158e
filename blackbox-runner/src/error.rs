//! Pipeline and pool errors

use blackbox_client::ClientError;
use blackbox_core::domain::ebook::Stage;
use blackbox_core::domain::error::ErrorKind;
use thiserror::Error;
use tracing::warn;

/// Invalid task pool construction or batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("concurrency limit must be greater than 0")]
    InvalidConcurrency,

    #[error("task batch is empty")]
    EmptyBatch,

    #[error("duplicate task index {0}")]
    DuplicateIndex(usize),

    #[error("task batch mixes phases")]
    MixedPhases,
}

/// Terminal pipeline failure, tagged with the stage that failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} stage failed: {kind}")]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: ErrorKind,
}

impl PipelineError {
    pub fn new(stage: Stage, kind: ErrorKind) -> Self {
        Self { stage, kind }
    }
}

/// A rejected batch is a caller mistake, never an upstream one
pub(crate) fn pool_error(err: PoolError) -> ErrorKind {
    ErrorKind::invalid_input(err.to_string())
}

/// Classifies a generation failure
///
/// A 4xx is a refused request (bad key, unknown model); a 5xx is the
/// service itself failing.
pub(crate) fn generation_error(err: ClientError) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_client_error() {
        warn!("Generation request rejected: {}", err);
        ErrorKind::upstream(format!("request rejected: {}", err))
    } else if err.is_server_error() {
        ErrorKind::upstream(format!("service unavailable: {}", err))
    } else {
        ErrorKind::upstream(err.to_string())
    }
}

/// Classifies a persistence failure
pub(crate) fn store_error(err: ClientError) -> ErrorKind {
    ErrorKind::Store(err.to_string())
}
