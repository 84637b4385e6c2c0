//! OAuth access tokens for Google Cloud REST calls.
//!
//! Credentials are handed in explicitly (a key file path or a pre-minted
//! token); nothing is read from or written to the process environment here.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

/// Scope covering both Cloud Storage and Speech-to-Text
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Source of bearer tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token (e.g. from `gcloud auth print-access-token`)
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Tokens minted from a service account key file
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
}

impl ServiceAccountTokens {
    /// Load a service account JSON key
    pub fn from_file(path: &Path) -> Result<Self> {
        let account = CustomServiceAccount::from_file(path).with_context(|| {
            format!("Failed to load service account key: {}", path.display())
        })?;
        Ok(Self { account })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .account
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .context("Failed to obtain access token from service account")?;
        Ok(token.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::new("ya29.test");
        assert_eq!(source.access_token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn test_missing_key_file_is_an_error() {
        let err = ServiceAccountTokens::from_file(Path::new("/nonexistent/key.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/key.json"));
    }
}
