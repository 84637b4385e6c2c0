//! FFmpeg adapter for resampling call audio.
//!
//! Spawns `ffmpeg -i <input> -ac 1 -ar 16000 <output>` and captures its
//! output. A failed conversion is returned as a [`ConversionError`] value.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::AudioConverter;

/// Target channel count
pub const TARGET_CHANNELS: u32 = 1;

/// Target sample rate in Hz
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Errors from the external conversion tool
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with exit code {exit_code}: {stderr}")]
    Failed {
        program: String,
        exit_code: i32,
        stderr: String,
    },
}

/// Converter backed by the `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    /// Path to the ffmpeg binary (default: "ffmpeg")
    binary_path: String,
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegConverter {
    /// Use `ffmpeg` from PATH
    pub fn new() -> Self {
        Self::with_binary_path("ffmpeg")
    }

    /// Use a specific ffmpeg binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }
}

/// Arguments forcing mono, 16 kHz output
pub fn conversion_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-ac".into(),
        TARGET_CHANNELS.to_string().into(),
        "-ar".into(),
        TARGET_SAMPLE_RATE.to_string().into(),
        output.as_os_str().to_owned(),
    ]
}

/// Last non-empty line of ffmpeg's stderr; the rest is banner and stream info
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        debug!(input = %input.display(), output = %output.display(), "Running ffmpeg");

        let result = Command::new(&self.binary_path)
            .args(conversion_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                program: self.binary_path.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ConversionError::Failed {
                program: self.binary_path.clone(),
                exit_code: result.status.code().unwrap_or(-1),
                stderr: stderr_tail(&result.stderr),
            });
        }

        Ok(())
    }
}
