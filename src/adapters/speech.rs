//! Google Cloud Speech-to-Text adapter (v1 REST).
//!
//! Recognition is submitted as a long-running operation and polled until it
//! reports `done`, bounded by the operation timeout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info};

use super::auth::TokenSource;
use super::{ensure_success, Transcript, TranscriptionProvider, TranscriptionRequest};

/// Public Speech-to-Text endpoint
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";

/// Recognition settings tuned for two-party phone calls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub use_enhanced: bool,
    pub model: String,
    pub diarization_config: DiarizationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiarizationConfig {
    pub enable_speaker_diarization: bool,
    pub min_speaker_count: u32,
    pub max_speaker_count: u32,
}

impl RecognitionConfig {
    /// LINEAR16 at 16 kHz, enhanced `phone_call` model, 2-10 speakers
    pub fn phone_call(language_code: impl Into<String>) -> Self {
        Self {
            encoding: "LINEAR16".to_string(),
            sample_rate_hertz: 16_000,
            language_code: language_code.into(),
            use_enhanced: true,
            model: "phone_call".to_string(),
            diarization_config: DiarizationConfig {
                enable_speaker_diarization: true,
                min_speaker_count: 2,
                max_speaker_count: 10,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RecognitionAudio<'a> {
    uri: &'a str,
}

#[derive(Debug, Serialize)]
struct LongRunningRecognizeRequest<'a> {
    config: RecognitionConfig,
    audio: RecognitionAudio<'a>,
}

/// google.longrunning.Operation
#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<RecognizeResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Top alternative of every result, in returned order
    fn into_transcript(self) -> Transcript {
        let segments = self
            .results
            .into_iter()
            .filter_map(|result| result.alternatives.into_iter().next())
            .map(|alternative| alternative.transcript)
            .collect();
        Transcript::new(segments)
    }
}

/// Speech-to-Text client
pub struct SpeechClient {
    endpoint: Url,
    tokens: Arc<dyn TokenSource>,
    poll_interval: Duration,
    operation_timeout: Duration,
    client: reqwest::Client,
}

impl SpeechClient {
    pub fn new(
        endpoint: &str,
        tokens: Arc<dyn TokenSource>,
        poll_interval: Duration,
        operation_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid speech endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Speech endpoint cannot be a base URL: {}", endpoint);
        }

        Ok(Self {
            endpoint,
            tokens,
            poll_interval,
            operation_timeout,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Speech endpoint cannot be a base URL: {}", self.endpoint))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.tokens.access_token().await?))
    }

    async fn submit(&self, request: &TranscriptionRequest) -> Result<Operation> {
        let body = LongRunningRecognizeRequest {
            config: RecognitionConfig::phone_call(&request.language_code),
            audio: RecognitionAudio { uri: &request.uri },
        };

        let response = self
            .client
            .post(self.url(&["v1", "speech:longrunningrecognize"])?)
            .header("Authorization", self.bearer().await?)
            .json(&body)
            .send()
            .await
            .context("Failed to submit recognition request")?;

        parse_operation(response, "Recognition request").await
    }

    async fn fetch_operation(&self, name: &str) -> Result<Operation> {
        let mut segments = vec!["v1", "operations"];
        segments.extend(name.split('/'));

        let response = self
            .client
            .get(self.url(&segments)?)
            .header("Authorization", self.bearer().await?)
            .send()
            .await
            .with_context(|| format!("Failed to poll operation {}", name))?;

        parse_operation(response, "Operation poll").await
    }

    /// Poll until the operation reports `done`
    async fn wait_for(&self, mut operation: Operation) -> Result<Operation> {
        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            let name = operation.name.clone();
            operation = self.fetch_operation(&name).await?;
            debug!(operation = %name, done = operation.done, "Polled recognition operation");
        }
        Ok(operation)
    }
}

async fn parse_operation(response: Response, action: &str) -> Result<Operation> {
    ensure_success(response, action)
        .await?
        .json()
        .await
        .context("Failed to parse operation response")
}

#[async_trait]
impl TranscriptionProvider for SpeechClient {
    fn name(&self) -> &str {
        "google-speech"
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcript> {
        let submitted = self.submit(request).await?;
        if submitted.name.is_empty() && !submitted.done {
            anyhow::bail!("Speech API returned an operation without a name");
        }
        info!(operation = %submitted.name, uri = %request.uri, "Recognition submitted");

        let operation = timeout(self.operation_timeout, self.wait_for(submitted))
            .await
            .map_err(|_| {
                anyhow!(
                    "Recognition did not complete within {:?}",
                    self.operation_timeout
                )
            })??;

        if let Some(error) = operation.error {
            anyhow::bail!("{} (code {})", error.message, error.code);
        }

        let transcript = operation.response.unwrap_or_default().into_transcript();
        info!(segments = transcript.segments.len(), "Recognition completed");
        Ok(transcript)
    }
}
