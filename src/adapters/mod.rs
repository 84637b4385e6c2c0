//! Adapter interfaces for external systems.
//!
//! The pipeline only talks to the outside world through three capabilities:
//! an object store, an audio converter and a transcription provider. Each has
//! a production implementation here and can be swapped for a test double.

pub mod auth;
pub mod ffmpeg;
pub mod gcs;
pub mod speech;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{ObjectInfo, ObjectRef};

// Re-export the production adapters
pub use auth::{ServiceAccountTokens, StaticToken, TokenSource};
pub use ffmpeg::{ConversionError, FfmpegConverter};
pub use gcs::GcsClient;
pub use speech::{RecognitionConfig, SpeechClient};

/// Bucket-addressed remote file storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects whose name starts with `prefix`, in store order
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Download an object to a local path
    async fn download(&self, object: &ObjectRef, dest: &Path) -> Result<()>;

    /// Upload a local file under the given object name
    async fn upload(&self, src: &Path, object: &ObjectRef) -> Result<()>;

    /// Delete an object
    async fn delete(&self, object: &ObjectRef) -> Result<()>;
}

/// Resamples audio to mono 16 kHz
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert `input` into `output`.
    ///
    /// Failures are returned as a typed [`ConversionError`] so the caller
    /// can report them without unwinding.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;
}

/// What to transcribe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest {
    /// Location of the converted audio (`gs://...`)
    pub uri: String,

    /// BCP-47 language code, e.g. `es-ES`
    pub language_code: String,
}

/// Ordered transcript segments as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub segments: Vec<String>,
}

impl Transcript {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Segments joined with newlines, in provider order
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

/// Turn a non-2xx response into an error carrying status and body.
///
/// Shared by the REST adapters so every Google API failure reads the same way.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} failed ({}): {}", action, status, body.trim())
}

/// Managed speech recognition with diarization
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run recognition to completion and return the top alternatives
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcript>;
}
