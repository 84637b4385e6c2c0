//! Failure taxonomy for one invocation.
//!
//! Every stage returns `Result<_, PipelineError>`; the variant decides the
//! message of the error report.

use thiserror::Error;

use crate::adapters::ConversionError;
use crate::domain::Report;

/// Usage line printed when the argument count is wrong
pub const USAGE: &str = "Usage: callscribe <bucket_name> <folder_path> <search_term>";

/// Errors that end a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{}", USAGE)]
    Usage,

    #[error("Configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("No call recordings matching in the Google Cloud Storage Bucket with the given {search_term}")]
    NoMatch { search_term: String },

    #[error("Error listing call recordings in bucket {bucket}: {cause:#}")]
    Listing {
        bucket: String,
        cause: anyhow::Error,
    },

    #[error("Error converting audio format: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Error during transcription: {0:#}")]
    Transcription(anyhow::Error),

    #[error("Error processing file {file_path}: {cause:#}")]
    Processing {
        file_path: String,
        cause: anyhow::Error,
    },
}

impl PipelineError {
    /// Wrap a download/upload/cleanup failure with the file being processed
    pub fn processing(file_path: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Processing {
            file_path: file_path.into(),
            cause: source.into(),
        }
    }

    /// Short machine-friendly kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Config(_) => "config",
            Self::NoMatch { .. } => "no_match",
            Self::Listing { .. } => "listing",
            Self::Conversion(_) => "conversion",
            Self::Transcription(_) => "transcription",
            Self::Processing { .. } => "processing",
        }
    }
}

impl From<&PipelineError> for Report {
    fn from(error: &PipelineError) -> Self {
        Report::error(error.to_string())
    }
}

impl From<Result<String, PipelineError>> for Report {
    fn from(result: Result<String, PipelineError>) -> Self {
        match result {
            Ok(transcript) => Report::success(transcript),
            Err(error) => Report::from(&error),
        }
    }
}
