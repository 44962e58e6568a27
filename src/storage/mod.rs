//! Object storage for ingested documents.

mod client;
pub mod faculties;
mod signing;
mod types;

use std::collections::BTreeMap;

use async_trait::async_trait;

pub use client::{MinioClient, public_read_policy};
pub use faculties::faculties_from_objects;
pub use types::{ObjectInfo, StorageError};

/// Bucket-scoped object store operations used by ingestion and the catalog endpoints.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes to.
    fn bucket(&self) -> &str;

    /// Policy document applied when the bucket is created.
    fn bucket_policy(&self) -> String;

    /// Whether the bucket exists.
    async fn bucket_exists(&self) -> Result<bool, StorageError>;

    /// Create the bucket.
    async fn make_bucket(&self) -> Result<(), StorageError>;

    /// Replace the bucket policy.
    async fn set_bucket_policy(&self, policy: &str) -> Result<(), StorageError>;

    /// Upload `body` under `key` with user metadata.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<(), StorageError>;

    /// List every object in the bucket.
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Create the bucket and apply its policy when missing. Returns `true` if it was created.
    async fn ensure_bucket(&self) -> Result<bool, StorageError> {
        if self.bucket_exists().await? {
            return Ok(false);
        }
        self.make_bucket().await?;
        self.set_bucket_policy(&self.bucket_policy()).await?;
        tracing::info!(bucket = %self.bucket(), "Bucket created and policy set");
        Ok(true)
    }

    /// Distinct faculty names across the bucket.
    async fn faculties(&self) -> Result<Vec<String>, StorageError> {
        let objects = self.list_objects().await?;
        Ok(faculties_from_objects(&objects))
    }
}
