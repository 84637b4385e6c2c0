//! callscribe - transcribe call recordings kept in Cloud Storage
//!
//! Given a bucket, a folder prefix and a `<phone>_<timestamp>` search term,
//! callscribe finds the matching recording, resamples it to mono 16 kHz with
//! ffmpeg, submits it to Speech-to-Text with speaker diarization and prints
//! the transcript as one JSON line.
//!
//! # Modules
//!
//! - `adapters`: External systems (Cloud Storage, Speech-to-Text, ffmpeg)
//! - `core`: Orchestration logic (Locator, Orchestrator, errors)
//! - `domain`: Data structures (SearchKey, ObjectInfo, Report)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! callscribe my-recordings calls/2024 34600111222_20240101T1015
//! # {"status":"success","transcript":"..."}
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{AudioConverter, ObjectStore, Transcript, TranscriptionProvider};
pub use crate::core::{Orchestrator, PipelineError, PipelineSettings, Request, Selection};
pub use domain::{ObjectInfo, ObjectRef, Report, SearchKey};
