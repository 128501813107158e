//! Data Transfer Objects for the HTTP API
//!
//! Request and response bodies exchanged between the orchestrator and its
//! callers. Field names are camelCase on the wire.

pub mod chapter;
pub mod ebook;
