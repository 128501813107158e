//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services drive the pipeline and shape its results into responses.

pub mod ebook;

// Re-export for convenience
pub use ebook as ebook_service;
