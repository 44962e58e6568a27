//! Drive API resources and errors.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while talking to the Drive API.
#[derive(Debug, Error)]
pub enum DriveError {
    /// API base URL failed to parse.
    #[error("Invalid Drive API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Drive responded with an unexpected status code.
    #[error("Unexpected Drive response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by Drive.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// A Drive user as embedded in file resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    /// Display name.
    pub display_name: Option<String>,
    /// Email address.
    pub email_address: Option<String>,
    /// Profile photo URL.
    pub photo_link: Option<String>,
}

/// Subset of the Drive `File` resource requested by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file identifier.
    pub id: String,
    /// File or folder name.
    pub name: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// RFC 3339 creation time.
    #[serde(default)]
    pub created_time: Option<String>,
    /// RFC 3339 last modification time.
    #[serde(default)]
    pub modified_time: Option<String>,
    /// Size in bytes, encoded as a decimal string by the API.
    #[serde(default)]
    pub size: Option<String>,
    /// Owners of the file; My Drive files have exactly one.
    #[serde(default)]
    pub owners: Vec<DriveUser>,
    /// Last user to modify the file.
    #[serde(default)]
    pub last_modifying_user: Option<DriveUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileList {
    #[serde(default)]
    pub(crate) files: Vec<DriveFile>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}
