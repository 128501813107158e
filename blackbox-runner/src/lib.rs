//! Blackbox Runner
//!
//! The e-book generation engine.
//!
//! Architecture:
//! - Pool: runs a batch of generation tasks under a concurrency ceiling and
//!   a single deadline, folding outcomes into an index-ordered phase result
//! - Pipeline: introduction, chapter titles, chapter content, persistence
//! - Prompts: deterministic prompt builders and completion cleanup
//! - Configuration: stage sizes, limits, timeouts and the failure policy
//!
//! The generation client and document store are injected, so a pipeline is
//! fully determined by its collaborators and configuration.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod prompts;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{FailurePolicy, PipelineConfig};
pub use error::{PipelineError, PoolError};
pub use pipeline::{Pipeline, StageSurvivors};
pub use pool::TaskPool;
pub use state::PipelineState;
