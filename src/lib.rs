//! Day1 Lookup Orchestrator
//!
//! Answers a single query by running up to three independent lookups
//! concurrently and merging them into one normalized document:
//! - web search
//! - quote retrieval for the requested instruments
//! - company profile (search, extract, summarize)
//!
//! PIPELINE:
//! PLAN → FAN OUT → JOIN → MERGE
//!
//! A failing lookup never aborts the others; its fault is recorded in the
//! result's `errors` list instead.

pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gemini;
pub mod merge;
pub mod models;
pub mod profile;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use agent::{Orchestrator, OrchestratorSettings};
pub use config::Day1Config;
pub use models::*;
pub use profile::ProfileLookup;
