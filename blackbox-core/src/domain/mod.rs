//! Core domain types
//!
//! This module contains the domain structures used across Blackbox crates.
//! They are shared between the runner (which produces them) and the
//! orchestrator (which serves and persists them).

pub mod ebook;
pub mod error;
pub mod request;
pub mod task;
