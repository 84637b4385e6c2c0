//! Inputs of a transcription run.
//!
//! A [`Request`] comes from the command line; [`PipelineSettings`] come from
//! the resolved configuration and stay the same across requests.

use std::path::PathBuf;

use super::locator::Selection;

/// Default recognition language
pub const DEFAULT_LANGUAGE_CODE: &str = "es-ES";

/// One invocation: where to look and what to look for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Bucket holding the recordings
    pub bucket: String,

    /// Folder prefix to list; converted copies are written under it too
    pub folder: String,

    /// `<phone>_<timestamp>[_...]`
    pub search_term: String,
}

impl Request {
    pub fn new(
        bucket: impl Into<String>,
        folder: impl Into<String>,
        search_term: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            folder: folder.into(),
            search_term: search_term.into(),
        }
    }
}

/// Per-process pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Recognition language (BCP-47)
    pub language_code: String,

    /// Directory under which each run creates its scratch directory
    pub temp_dir: PathBuf,

    /// Which match to transcribe when several recordings match
    pub selection: Selection,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            temp_dir: std::env::temp_dir(),
            selection: Selection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.language_code, "es-ES");
        assert_eq!(settings.selection, Selection::First);
        assert_eq!(settings.temp_dir, std::env::temp_dir());
    }

    #[test]
    fn test_request_new() {
        let request = Request::new("recordings", "calls/2024", "101_20240101");
        assert_eq!(request.bucket, "recordings");
        assert_eq!(request.folder, "calls/2024");
        assert_eq!(request.search_term, "101_20240101");
    }
}
