//! Blackbox Core
//!
//! Core types shared by the Blackbox e-book generation services.
//!
//! This crate contains:
//! - Domain types: generation requests, tasks, outcomes and e-book documents
//! - DTOs: request/response bodies exchanged over HTTP

pub mod domain;
pub mod dto;
