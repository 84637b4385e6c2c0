//! Main orchestrator for a transcription run.
//!
//! Stages run strictly in order:
//! locate → download → convert → upload → transcribe → cleanup.
//! Each stage yields `Result<_, PipelineError>` and the first failure ends
//! the run. Local files live in a per-run scratch directory that is removed
//! on every exit path; the uploaded copy is deleted once it has been
//! submitted for transcription, whatever the outcome.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{error, info, instrument, warn};

use crate::adapters::{
    AudioConverter, ObjectStore, Transcript, TranscriptionProvider, TranscriptionRequest,
};
use crate::domain::object::file_name;
use crate::domain::{converted_file_name, converted_object_name, ObjectRef, Report};

use super::error::PipelineError;
use super::locator;
use super::pipeline::{PipelineSettings, Request};

/// Scratch directory prefix
const SCRATCH_PREFIX: &str = "callscribe-";

/// Main pipeline orchestrator
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    converter: Arc<dyn AudioConverter>,
    transcriber: Arc<dyn TranscriptionProvider>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        converter: Arc<dyn AudioConverter>,
        transcriber: Arc<dyn TranscriptionProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            converter,
            transcriber,
            settings,
        }
    }

    /// Run the pipeline and fold the outcome into a report
    #[instrument(skip(self, request), fields(bucket = %request.bucket, search_term = %request.search_term))]
    pub async fn run(&self, request: &Request) -> Report {
        let result = self.execute(request).await;

        match &result {
            Ok(transcript) => info!(chars = transcript.len(), "Run completed successfully"),
            Err(e) => error!(kind = e.kind(), error = %e, "Run failed"),
        }

        Report::from(result)
    }

    /// Run the pipeline, returning the joined transcript
    pub async fn execute(&self, request: &Request) -> Result<String, PipelineError> {
        // Locate
        let matches = locator::search(
            self.store.as_ref(),
            &request.bucket,
            &request.folder,
            &request.search_term,
        )
        .await
        .map_err(|cause| PipelineError::Listing {
            bucket: request.bucket.clone(),
            cause,
        })?;

        let selected = self
            .settings
            .selection
            .pick(&matches)
            .ok_or_else(|| PipelineError::NoMatch {
                search_term: request.search_term.clone(),
            })?;
        let file_path = selected.name.clone();
        info!(
            object = %file_path,
            matched = matches.len(),
            selection = ?self.settings.selection,
            "Selected recording"
        );

        let scratch = create_scratch_dir(&self.settings.temp_dir)
            .map_err(|e| PipelineError::processing(&file_path, e))?;
        let local_path = scratch.path().join(file_name(&file_path));
        let converted_path = scratch.path().join(converted_file_name(&file_path));

        // Download
        let source = ObjectRef::new(&request.bucket, &file_path);
        self.store
            .download(&source, &local_path)
            .await
            .map_err(|e| PipelineError::processing(&file_path, e))?;

        // Convert
        self.converter.convert(&local_path, &converted_path).await?;
        info!(output = %converted_path.display(), "Converted to mono 16 kHz");

        // Upload
        let converted = ObjectRef::new(
            &request.bucket,
            converted_object_name(&request.folder, &file_path),
        );
        self.store
            .upload(&converted_path, &converted)
            .await
            .map_err(|e| PipelineError::processing(&file_path, e))?;
        info!(uri = %converted.uri(), "Uploaded converted audio");

        // Transcribe, then remove the uploaded copy regardless of outcome
        info!(provider = self.transcriber.name(), language = %self.settings.language_code, "Transcribing");
        let transcription = self
            .transcriber
            .transcribe(&TranscriptionRequest {
                uri: converted.uri(),
                language_code: self.settings.language_code.clone(),
            })
            .await;
        let deletion = self.store.delete(&converted).await;

        let transcript = settle(transcription, deletion, &file_path, &converted)?;

        close_scratch_dir(scratch);
        Ok(transcript.text())
    }
}

/// Combine transcription and remote cleanup outcomes.
///
/// A transcription failure wins over a cleanup failure, which is only logged.
fn settle(
    transcription: anyhow::Result<Transcript>,
    deletion: anyhow::Result<()>,
    file_path: &str,
    converted: &ObjectRef,
) -> Result<Transcript, PipelineError> {
    match (transcription, deletion) {
        (Ok(transcript), Ok(())) => Ok(transcript),
        (Ok(_), Err(e)) => Err(PipelineError::processing(file_path, e)),
        (Err(e), deletion) => {
            if let Err(cleanup) = deletion {
                warn!(uri = %converted.uri(), error = %cleanup, "Failed to delete converted object");
            }
            Err(PipelineError::Transcription(e))
        }
    }
}

fn create_scratch_dir(temp_dir: &Path) -> std::io::Result<TempDir> {
    std::fs::create_dir_all(temp_dir)?;
    tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(temp_dir)
}

/// Remove the scratch directory, logging instead of failing
fn close_scratch_dir(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
    }
}
