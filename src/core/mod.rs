//! Core orchestration logic.
//!
//! This module contains:
//! - Locator: search-key matching over a bucket listing
//! - Pipeline: request and settings for a run
//! - Orchestrator: the stage sequence and cleanup
//! - Error: the failure taxonomy reported to the caller

pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod pipeline;

// Re-export commonly used types
pub use error::{PipelineError, USAGE};
pub use locator::{filter_matches, search, Selection};
pub use orchestrator::Orchestrator;
pub use pipeline::{PipelineSettings, Request, DEFAULT_LANGUAGE_CODE};
