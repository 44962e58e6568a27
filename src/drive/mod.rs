//! Source documents hosted on Google Drive.

mod client;
mod types;

use async_trait::async_trait;

pub use client::{DriveClient, FOLDER_MIME_TYPE, PDF_MIME_TYPE};
pub use types::{DriveError, DriveFile, DriveUser};

/// Folder listing and download operations the ingestion walk depends on.
#[async_trait]
pub trait DriveSource: Send + Sync {
    /// Immediate subfolders of `parent_id`, in listing order.
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError>;

    /// PDF files directly inside `parent_id`, in listing order.
    async fn list_pdfs(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError>;

    /// Raw bytes of `file_id`.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;
}

#[async_trait]
impl DriveSource for DriveClient {
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        DriveClient::list_folders(self, parent_id).await
    }

    async fn list_pdfs(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        DriveClient::list_pdfs(self, parent_id).await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        DriveClient::download(self, file_id).await
    }
}
