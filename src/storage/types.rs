//! Error and listing types for the object store.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Endpoint URL failed to parse or has no host.
    #[error("Invalid object store endpoint: {0}")]
    InvalidEndpoint(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Object store responded with an unexpected status code.
    #[error("Unexpected object store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response body could not be decoded.
    #[error("Malformed object store response: {0}")]
    InvalidResponse(String),
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by the store.
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// `ListObjectsV2` response document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListBucketResult {
    #[serde(default)]
    pub(crate) contents: Vec<ObjectInfo>,
    #[serde(default)]
    pub(crate) is_truncated: bool,
    #[serde(default)]
    pub(crate) next_continuation_token: Option<String>,
}
