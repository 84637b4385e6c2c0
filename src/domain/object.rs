//! References to objects in the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix given to the mono/16 kHz copy of a recording
pub const CONVERTED_PREFIX: &str = "converted_";

/// An object as returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full object path inside the bucket
    pub name: String,

    /// Creation time reported by the store (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Size in bytes (if reported)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ObjectInfo {
    /// Object with a name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: None,
            size: None,
        }
    }

    /// Last path component of the object name
    pub fn file_name(&self) -> &str {
        file_name(&self.name)
    }
}

/// Bucket + object path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// `gs://<bucket>/<name>`
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Last `/`-separated component of an object path
pub fn file_name(object_name: &str) -> &str {
    object_name.rsplit('/').next().unwrap_or(object_name)
}

/// File name for the converted copy of a recording.
///
/// The extension is always `.wav` since the converted audio is LINEAR16.
pub fn converted_file_name(object_name: &str) -> String {
    let base = file_name(object_name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    format!("{}{}.wav", CONVERTED_PREFIX, stem)
}

/// Remote object name for the converted copy, placed under `folder`
pub fn converted_object_name(folder: &str, object_name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    let file = converted_file_name(object_name);
    if folder.is_empty() {
        file
    } else {
        format!("{}/{}", folder, file)
    }
}
