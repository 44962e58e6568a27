//! Google Drive v3 REST client authenticated with a bearer token.

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::TryStreamExt;
use reqwest::{Client, Url};

use super::types::{DriveError, DriveFile, FileList};

/// MIME type Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
/// MIME type of the documents ingestion picks up.
pub const PDF_MIME_TYPE: &str = "application/pdf";

const FOLDER_FIELDS: &str = "nextPageToken, files(id, name)";
const PDF_FIELDS: &str = "nextPageToken, files(id, name, mimeType, createdTime, modifiedTime, size, owners, lastModifyingUser)";
const PAGE_SIZE: &str = "1000";

/// Read-only Drive client.
#[derive(Clone)]
pub struct DriveClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl DriveClient {
    /// Construct a client for `api_url` (e.g. `https://www.googleapis.com/drive/v3`).
    pub fn new(api_url: &str, access_token: impl Into<String>) -> Result<Self, DriveError> {
        let client = Client::builder().user_agent("docsearch/0.1").build()?;
        let parsed = Url::parse(api_url).map_err(|err| DriveError::InvalidUrl(err.to_string()))?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        tracing::debug!(url = %base_url, "Initialized Drive client");

        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Immediate subfolders of `parent_id`, across all result pages.
    pub async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let query = format!("'{parent_id}' in parents and mimeType = '{FOLDER_MIME_TYPE}'");
        self.stream_files(query, FOLDER_FIELDS).try_collect().await
    }

    /// PDF files directly inside `parent_id`, across all result pages.
    pub async fn list_pdfs(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let query = format!("'{parent_id}' in parents and mimeType='{PDF_MIME_TYPE}'");
        self.stream_files(query, PDF_FIELDS).try_collect().await
    }

    /// Download the raw bytes of `file_id`.
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let response = self
            .client
            .get(format!("{}/files/{file_id}", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = ensure_success(response, "download file").await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Stream every file matching `query`, following `nextPageToken`.
    fn stream_files<'a>(
        &'a self,
        query: String,
        fields: &'static str,
    ) -> impl Stream<Item = Result<DriveFile, DriveError>> + Send + 'a {
        try_stream! {
            let mut page_token: Option<String> = None;
            loop {
                let mut params = vec![
                    ("q", query.as_str()),
                    ("fields", fields),
                    ("pageSize", PAGE_SIZE),
                ];
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }

                let response = self
                    .client
                    .get(format!("{}/files", self.base_url))
                    .bearer_auth(&self.access_token)
                    .query(&params)
                    .send()
                    .await?;
                let response = ensure_success(response, "list files").await?;
                let page: FileList = response.json().await?;

                for file in page.files {
                    yield file;
                }

                match page.next_page_token {
                    Some(next) if !next.is_empty() => page_token = Some(next),
                    _ => break,
                }
            }
        }
    }
}

async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, DriveError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let error = DriveError::UnexpectedStatus { status, body };
    tracing::error!(operation, error = %error, "Drive request failed");
    Err(error)
}
