//! Configuration for callscribe.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CALLSCRIBE_*, GOOGLE_APPLICATION_CREDENTIALS)
//! 2. Config file ($CALLSCRIBE_CONFIG, else .callscribe/config.yaml in the
//!    current directory or a parent, else ~/.callscribe/config.yaml)
//! 3. Defaults
//!
//! Paths in the config file are relative to the directory holding it.
//! The resolved values are handed to the clients explicitly; the process
//! environment is only read, never written.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::gcs::DEFAULT_STORAGE_ENDPOINT;
use crate::adapters::speech::DEFAULT_SPEECH_ENDPOINT;
use crate::adapters::{ServiceAccountTokens, StaticToken, TokenSource};
use crate::core::{PipelineSettings, Selection, DEFAULT_LANGUAGE_CODE};

/// Key file looked up next to the executable when nothing else is configured
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 10_000;
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10_000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Service account key file
    pub credentials: Option<String>,
    pub language_code: Option<String>,
    pub temp_dir: Option<String>,
    pub selection: Option<Selection>,
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FfmpegConfig {
    pub binary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub upload_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    pub endpoint: Option<String>,
    pub poll_interval_seconds: Option<u64>,
    pub operation_timeout_seconds: Option<u64>,
}

/// Where bearer tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service account JSON key
    KeyFile(PathBuf),
    /// Pre-minted OAuth access token
    AccessToken(String),
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub language_code: String,
    pub temp_dir: PathBuf,
    pub selection: Selection,
    pub ffmpeg_binary: String,
    pub storage_endpoint: String,
    pub speech_endpoint: String,
    pub upload_timeout: Duration,
    pub poll_interval: Duration,
    pub operation_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Settings consumed by the orchestrator
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            language_code: self.language_code.clone(),
            temp_dir: self.temp_dir.clone(),
            selection: self.selection,
        }
    }

    /// Build the token source named by `credentials`
    pub fn token_source(&self) -> Result<Arc<dyn TokenSource>> {
        Ok(match &self.credentials {
            Credentials::AccessToken(token) => Arc::new(StaticToken::new(token.clone())),
            Credentials::KeyFile(path) => Arc::new(ServiceAccountTokens::from_file(path)?),
        })
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".callscribe").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".callscribe").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_config(content: &str) -> Result<ConfigFile> {
    // An empty file is a valid, empty config
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// `credentials.json` next to the running executable
fn default_credentials_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CREDENTIALS_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE))
}

/// Merge environment, config file and defaults.
///
/// `lookup` reads a variable by name; non-empty values win over the file.
pub fn resolve(
    file: Option<(&Path, ConfigFile)>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let (config_file, file) = match file {
        Some((path, file)) => (Some(path.to_path_buf()), file),
        None => (None, ConfigFile::default()),
    };
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let credentials = if let Some(token) = env("CALLSCRIBE_ACCESS_TOKEN") {
        Credentials::AccessToken(token)
    } else if let Some(path) = env("CALLSCRIBE_CREDENTIALS")
        .or_else(|| env("GOOGLE_APPLICATION_CREDENTIALS"))
    {
        Credentials::KeyFile(PathBuf::from(path))
    } else if let Some(ref path) = file.credentials {
        Credentials::KeyFile(resolve_path(&base_dir, path))
    } else {
        Credentials::KeyFile(default_credentials_path())
    };

    let language_code = env("CALLSCRIBE_LANGUAGE")
        .or(file.language_code)
        .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string());

    let temp_dir = if let Some(dir) = env("CALLSCRIBE_TEMP_DIR") {
        PathBuf::from(dir)
    } else if let Some(ref dir) = file.temp_dir {
        resolve_path(&base_dir, dir)
    } else {
        std::env::temp_dir()
    };

    let ffmpeg_binary = env("CALLSCRIBE_FFMPEG")
        .or(file.ffmpeg.binary)
        .unwrap_or_else(|| "ffmpeg".to_string());

    let poll_interval = file
        .speech
        .poll_interval_seconds
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    if poll_interval == 0 {
        anyhow::bail!("speech.poll_interval_seconds must be at least 1");
    }

    Ok(ResolvedConfig {
        credentials,
        language_code,
        temp_dir,
        selection: file.selection.unwrap_or_default(),
        ffmpeg_binary,
        storage_endpoint: file
            .storage
            .endpoint
            .unwrap_or_else(|| DEFAULT_STORAGE_ENDPOINT.to_string()),
        speech_endpoint: file
            .speech
            .endpoint
            .unwrap_or_else(|| DEFAULT_SPEECH_ENDPOINT.to_string()),
        upload_timeout: Duration::from_secs(
            file.storage
                .upload_timeout_seconds
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        ),
        poll_interval: Duration::from_secs(poll_interval),
        operation_timeout: Duration::from_secs(
            file.speech
                .operation_timeout_seconds
                .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS),
        ),
        config_file,
    })
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let config_path = std::env::var("CALLSCRIBE_CONFIG")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(find_config_file);

    let file = match config_path {
        Some(ref path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    resolve(file, |key| std::env::var(key).ok())
}
