//! Command-line interface for callscribe.
//!
//! `callscribe <bucket_name> <folder_path> <search_term>`
//!
//! Every invocation produces exactly one [`Report`]; argument and
//! configuration problems are reported the same way as pipeline failures.

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::adapters::{FfmpegConverter, GcsClient, SpeechClient};
use crate::config::{load_config, ResolvedConfig};
use crate::core::{Orchestrator, PipelineError, Request};
use crate::domain::Report;

/// callscribe - transcribe a call recording stored in Cloud Storage
#[derive(Parser, Debug)]
#[command(name = "callscribe")]
#[command(author, version, about, long_about = None)]
// Any three strings are data, including `-1_...` or `--help`
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Bucket holding the recordings
    #[arg(allow_hyphen_values = true)]
    pub bucket_name: String,

    /// Folder (object prefix) to search
    #[arg(allow_hyphen_values = true)]
    pub folder_path: String,

    /// `<phone>_<timestamp>` key, extra `_` parts are ignored
    #[arg(allow_hyphen_values = true)]
    pub search_term: String,
}

impl Cli {
    pub fn into_request(self) -> Request {
        Request::new(self.bucket_name, self.folder_path, self.search_term)
    }
}

/// Wire production adapters from the resolved configuration
pub fn build_orchestrator(config: &ResolvedConfig) -> Result<Orchestrator> {
    debug!(
        config_file = ?config.config_file,
        storage = %config.storage_endpoint,
        speech = %config.speech_endpoint,
        "Using configuration"
    );
    let tokens = config.token_source()?;

    let store = GcsClient::new(
        &config.storage_endpoint,
        tokens.clone(),
        config.upload_timeout,
    )?;
    let transcriber = SpeechClient::new(
        &config.speech_endpoint,
        tokens,
        config.poll_interval,
        config.operation_timeout,
    )?;
    let converter = FfmpegConverter::with_binary_path(&config.ffmpeg_binary);

    Ok(Orchestrator::new(
        Arc::new(store),
        Arc::new(converter),
        Arc::new(transcriber),
        config.pipeline_settings(),
    ))
}

/// Parse `args` (including the program name) and run one transcription
pub async fn invoke<I, T>(args: I) -> Report
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            debug!(error = %e, "Argument parsing failed");
            return Report::from(&PipelineError::Usage);
        }
    };

    let orchestrator = match load_config().and_then(|config| build_orchestrator(&config)) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return Report::from(&PipelineError::Config(e)),
    };

    orchestrator.run(&cli.into_request()).await
}
