//! Google Cloud Storage adapter (JSON API over HTTPS).
//!
//! Endpoints used:
//! - `GET  /storage/v1/b/{bucket}/o?prefix=` (paged listing)
//! - `GET  /storage/v1/b/{bucket}/o/{object}?alt=media`
//! - `POST /upload/storage/v1/b/{bucket}/o?uploadType=media&name=`
//! - `DELETE /storage/v1/b/{bucket}/o/{object}`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Url};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::auth::TokenSource;
use super::{ensure_success, ObjectStore};
use crate::domain::{ObjectInfo, ObjectRef};

/// Public Cloud Storage endpoint
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

/// Cloud Storage client
pub struct GcsClient {
    endpoint: Url,
    tokens: Arc<dyn TokenSource>,
    upload_timeout: Duration,
    client: reqwest::Client,
}

/// One page of `objects.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    items: Vec<StorageObject>,
    next_page_token: Option<String>,
}

/// Object resource (only the fields we read)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    name: String,
    /// `updated` also moves on metadata edits, so rank by creation
    time_created: Option<DateTime<Utc>>,
    /// uint64 encoded as a string
    size: Option<String>,
}

impl From<StorageObject> for ObjectInfo {
    fn from(object: StorageObject) -> Self {
        Self {
            name: object.name,
            created: object.time_created,
            size: object.size.and_then(|s| s.parse().ok()),
        }
    }
}

impl GcsClient {
    /// Create a client against `endpoint`
    pub fn new(endpoint: &str, tokens: Arc<dyn TokenSource>, upload_timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid storage endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Storage endpoint cannot be a base URL: {}", endpoint);
        }

        Ok(Self {
            endpoint,
            tokens,
            upload_timeout,
            client: reqwest::Client::new(),
        })
    }

    /// Build `{endpoint}/{segments...}`, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Storage endpoint cannot be a base URL: {}", self.endpoint))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, object: &ObjectRef) -> Result<Url> {
        self.url(&["storage", "v1", "b", &object.bucket, "o", &object.name])
    }

    async fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.tokens.access_token().await?))
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let url = self.url(&["storage", "v1", "b", bucket, "o"])?;
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header("Authorization", self.bearer().await?)
                .query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to list objects in bucket '{}'", bucket))?;
            let page: ListPage = ensure_success(response, "Object listing")
                .await?
                .json()
                .await
                .context("Failed to parse object listing")?;

            objects.extend(page.items.into_iter().map(ObjectInfo::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(bucket, prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    async fn download(&self, object: &ObjectRef, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(self.object_url(object)?)
            .header("Authorization", self.bearer().await?)
            .query(&[("alt", "media")])
            .send()
            .await
            .with_context(|| format!("Failed to download {}", object.uri()))?;
        let mut response = ensure_success(response, "Download").await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed reading body of {}", object.uri()))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }
        file.flush().await?;

        debug!(uri = %object.uri(), dest = %dest.display(), "Downloaded object");
        Ok(())
    }

    async fn upload(&self, src: &Path, object: &ObjectRef) -> Result<()> {
        // Streamed from disk with the length known up front
        let file = tokio::fs::File::open(src)
            .await
            .with_context(|| format!("Failed to open {}", src.display()))?;
        let size = file
            .metadata()
            .await
            .with_context(|| format!("Failed to stat {}", src.display()))?
            .len();

        let response = self
            .client
            .post(self.url(&["upload", "storage", "v1", "b", &object.bucket, "o"])?)
            .header("Authorization", self.bearer().await?)
            .header(CONTENT_TYPE, "audio/wav")
            .header(CONTENT_LENGTH, size)
            .query(&[("uploadType", "media"), ("name", object.name.as_str())])
            .timeout(self.upload_timeout)
            .body(Body::from(file))
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", object.uri()))?;
        ensure_success(response, "Upload").await?;

        debug!(uri = %object.uri(), size, "Uploaded object");
        Ok(())
    }

    async fn delete(&self, object: &ObjectRef) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(object)?)
            .header("Authorization", self.bearer().await?)
            .send()
            .await
            .with_context(|| format!("Failed to delete {}", object.uri()))?;
        ensure_success(response, "Delete").await?;

        debug!(uri = %object.uri(), "Deleted object");
        Ok(())
    }
}
