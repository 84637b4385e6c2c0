//! Test doubles for the three pipeline capabilities.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use callscribe::adapters::{ConversionError, TranscriptionRequest};
use callscribe::{
    AudioConverter, ObjectInfo, ObjectRef, ObjectStore, Orchestrator, PipelineSettings,
    Transcript, TranscriptionProvider,
};
use tempfile::TempDir;

/// Bucket-aware store that keeps insertion order for listings
#[derive(Default)]
pub struct InMemoryStore {
    pub objects: Mutex<Vec<(String, ObjectInfo, Vec<u8>)>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_list: bool,
    pub fail_download: bool,
    pub fail_delete: bool,
}

impl InMemoryStore {
    pub fn with_objects(bucket: &str, names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.insert(bucket, ObjectInfo::named(*name), name.as_bytes().to_vec());
        }
        store
    }

    pub fn insert(&self, bucket: &str, info: ObjectInfo, data: Vec<u8>) {
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|(b, o, _)| !(b == bucket && o.name == info.name));
        objects.push((bucket.to_string(), info, data));
    }

    /// Object names in a bucket, in insertion order
    pub fn names(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _, _)| b == bucket)
            .map(|(_, o, _)| o.name.clone())
            .collect()
    }

    /// Operations performed, e.g. `list`, `download:a/x.wav`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(anyhow!("403 Forbidden"));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, o, _)| b == bucket && o.name.starts_with(prefix))
            .map(|(_, o, _)| o.clone())
            .collect())
    }

    async fn download(&self, object: &ObjectRef, dest: &Path) -> Result<()> {
        self.record(format!("download:{}", object.name));
        if self.fail_download {
            return Err(anyhow!("connection reset"));
        }
        let data = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .find(|(b, o, _)| *b == object.bucket && o.name == object.name)
            .map(|(_, _, d)| d.clone())
            .ok_or_else(|| anyhow!("404 Not Found"))?;
        tokio::fs::write(dest, data).await?;
        Ok(())
    }

    async fn upload(&self, src: &Path, object: &ObjectRef) -> Result<()> {
        self.record(format!("upload:{}", object.name));
        let data = tokio::fs::read(src).await?;
        self.insert(&object.bucket, ObjectInfo::named(object.name.clone()), data);
        Ok(())
    }

    async fn delete(&self, object: &ObjectRef) -> Result<()> {
        self.record(format!("delete:{}", object.name));
        if self.fail_delete {
            return Err(anyhow!("503 Service Unavailable"));
        }
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|(b, o, _)| !(*b == object.bucket && o.name == object.name));
        if objects.len() == before {
            return Err(anyhow!("404 Not Found"));
        }
        Ok(())
    }
}

/// Copies input to output, or fails like a non-zero ffmpeg exit
#[derive(Default)]
pub struct FakeConverter {
    pub fail: bool,
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioConverter for FakeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ConversionError::Failed {
                program: "ffmpeg".to_string(),
                exit_code: 1,
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        tokio::fs::copy(input, output)
            .await
            .map_err(|source| ConversionError::Spawn {
                program: "ffmpeg".to_string(),
                source,
            })?;
        Ok(())
    }
}

/// Returns canned segments or a canned failure
pub struct FakeTranscriber {
    outcome: std::result::Result<Vec<String>, String>,
    requests: Mutex<Vec<TranscriptionRequest>>,
}

impl FakeTranscriber {
    pub fn returning(segments: &[&str]) -> Self {
        Self {
            outcome: Ok(segments.iter().map(|s| s.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<TranscriptionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionProvider for FakeTranscriber {
    fn name(&self) -> &str {
        "fake"
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcript> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Ok(segments) => Ok(Transcript::new(segments.clone())),
            Err(message) => Err(anyhow!("{}", message)),
        }
    }
}

/// Orchestrator over the given doubles, with a private scratch root
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub converter: Arc<FakeConverter>,
    pub transcriber: Arc<FakeTranscriber>,
    pub orchestrator: Orchestrator,
    pub scratch_root: TempDir,
}

impl Harness {
    pub fn new(store: InMemoryStore, converter: FakeConverter, transcriber: FakeTranscriber) -> Self {
        Self::with_settings(store, converter, transcriber, PipelineSettings::default())
    }

    pub fn with_settings(
        store: InMemoryStore,
        converter: FakeConverter,
        transcriber: FakeTranscriber,
        settings: PipelineSettings,
    ) -> Self {
        let scratch_root = TempDir::new().unwrap();
        let store = Arc::new(store);
        let converter = Arc::new(converter);
        let transcriber = Arc::new(transcriber);

        let orchestrator = Orchestrator::new(
            store.clone(),
            converter.clone(),
            transcriber.clone(),
            PipelineSettings {
                temp_dir: scratch_root.path().to_path_buf(),
                ..settings
            },
        );

        Self {
            store,
            converter,
            transcriber,
            orchestrator,
            scratch_root,
        }
    }

    /// Entries left behind under the scratch root
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch_root.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}
