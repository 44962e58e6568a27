//! Depth-first copy of scoped Drive folders into the object store.

use super::metadata::{FileMetadata, MetadataError};
use crate::drive::{DriveError, DriveFile, DriveSource, PDF_MIME_TYPE};
use crate::storage::{ObjectStore, StorageError};
use thiserror::Error;

/// Errors raised while ingesting documents.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Drive listing or download failed.
    #[error(transparent)]
    Drive(#[from] DriveError),
    /// Object store write failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// File attributes failed validation.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// What to do when a folder or file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and carry on with the remaining items.
    #[default]
    Continue,
    /// Stop at the first failure and return it.
    Abort,
}

/// A folder or file that could not be ingested.
#[derive(Debug)]
pub struct IngestFailure {
    /// Folder path or `<folder>/<file name>` of the failing item.
    pub path: String,
    /// Underlying error.
    pub error: IngestError,
}

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Object keys written, in walk order.
    pub uploaded: Vec<String>,
    /// Items skipped because of an error.
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    /// `true` when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct PendingFolder {
    id: String,
    path: String,
}

/// Walks Drive folders and uploads every PDF it finds.
pub struct IngestionWalker<D, S> {
    drive: D,
    store: S,
}

impl<D, S> IngestionWalker<D, S>
where
    D: DriveSource,
    S: ObjectStore,
{
    /// Pair a Drive source with the destination store.
    pub fn new(drive: D, store: S) -> Self {
        Self { drive, store }
    }

    /// Ingest every folder under `root_folder_id` whose name is listed in `scopes`.
    ///
    /// Each folder contributes its own PDFs first and then its subfolders, in listing order.
    /// Only a failure to list the root is returned as `Err` under [`FailurePolicy::Continue`].
    pub async fn run(
        &self,
        root_folder_id: &str,
        scopes: &[String],
        policy: FailurePolicy,
    ) -> Result<IngestReport, IngestError> {
        let roots = self.drive.list_folders(root_folder_id).await?;
        let mut stack: Vec<PendingFolder> = roots
            .into_iter()
            .filter(|folder| scopes.iter().any(|scope| scope == &folder.name))
            .map(|folder| PendingFolder {
                path: folder.name,
                id: folder.id,
            })
            .rev()
            .collect();

        let mut report = IngestReport::default();
        let mut bucket_ready = false;

        while let Some(folder) = stack.pop() {
            tracing::info!(folder = %folder.path, "Processing folder");

            match self.drive.list_pdfs(&folder.id).await {
                Ok(files) => {
                    for file in files {
                        let outcome = self
                            .ingest_file(&file, &folder.path, &mut bucket_ready)
                            .await;
                        match outcome {
                            Ok(location) => report.uploaded.push(location),
                            Err(error) => record(
                                &mut report,
                                format!("{}/{}", folder.path, file.name),
                                error,
                                policy,
                            )?,
                        }
                    }
                }
                Err(error) => record(&mut report, folder.path.clone(), error.into(), policy)?,
            }

            match self.drive.list_folders(&folder.id).await {
                Ok(children) => stack.extend(children.into_iter().rev().map(|child| {
                    PendingFolder {
                        path: format!("{}/{}", folder.path, child.name),
                        id: child.id,
                    }
                })),
                Err(error) => record(&mut report, folder.path.clone(), error.into(), policy)?,
            }
        }

        tracing::info!(
            uploaded = report.uploaded.len(),
            failed = report.failures.len(),
            "Ingestion finished"
        );
        Ok(report)
    }

    async fn ingest_file(
        &self,
        file: &DriveFile,
        folder_path: &str,
        bucket_ready: &mut bool,
    ) -> Result<String, IngestError> {
        let metadata = FileMetadata::from_drive_file(file, folder_path)?;
        let body = self.drive.download(&file.id).await?;

        if !*bucket_ready {
            self.store.ensure_bucket().await?;
            *bucket_ready = true;
        }

        self.store
            .put_object(
                &metadata.location,
                body,
                PDF_MIME_TYPE,
                &metadata.object_metadata(),
            )
            .await?;
        tracing::info!(
            bucket = %self.store.bucket(),
            location = %metadata.location,
            "Uploaded document"
        );
        Ok(metadata.location)
    }
}

fn record(
    report: &mut IngestReport,
    path: String,
    error: IngestError,
    policy: FailurePolicy,
) -> Result<(), IngestError> {
    tracing::error!(path = %path, error = %error, "Ingestion failed for item");
    match policy {
        FailurePolicy::Abort => Err(error),
        FailurePolicy::Continue => {
            report.failures.push(IngestFailure { path, error });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveUser;
    use crate::storage::ObjectInfo;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDrive {
        folders: HashMap<String, Vec<DriveFile>>,
        pdfs: HashMap<String, Vec<DriveFile>>,
        broken: Vec<String>,
    }

    impl FakeDrive {
        fn folder(mut self, parent: &str, id: &str, name: &str) -> Self {
            self.folders
                .entry(parent.into())
                .or_default()
                .push(DriveFile {
                    id: id.into(),
                    name: name.into(),
                    ..DriveFile::default()
                });
            self
        }

        fn pdf(mut self, parent: &str, id: &str, name: &str) -> Self {
            self.pdfs.entry(parent.into()).or_default().push(pdf(id, name));
            self
        }

        fn broken(mut self, id: &str) -> Self {
            self.broken.push(id.into());
            self
        }

        fn check(&self, id: &str) -> Result<(), DriveError> {
            if self.broken.iter().any(|broken| broken == id) {
                return Err(DriveError::UnexpectedStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: format!("{id} unavailable"),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DriveSource for FakeDrive {
        async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
            self.check(parent_id)?;
            Ok(self.folders.get(parent_id).cloned().unwrap_or_default())
        }

        async fn list_pdfs(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
            self.check(parent_id)?;
            Ok(self.pdfs.get(parent_id).cloned().unwrap_or_default())
        }

        async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
            self.check(file_id)?;
            Ok(format!("%PDF {file_id}").into_bytes())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        exists: bool,
        calls: Mutex<Vec<String>>,
        objects: Mutex<Vec<(String, Vec<u8>, BTreeMap<String, String>)>>,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        fn bucket(&self) -> &str {
            "document"
        }

        fn bucket_policy(&self) -> String {
            "{}".into()
        }

        async fn bucket_exists(&self) -> Result<bool, StorageError> {
            self.calls.lock().unwrap().push("exists".into());
            Ok(self.exists)
        }

        async fn make_bucket(&self) -> Result<(), StorageError> {
            self.calls.lock().unwrap().push("make".into());
            Ok(())
        }

        async fn set_bucket_policy(&self, _policy: &str) -> Result<(), StorageError> {
            self.calls.lock().unwrap().push("policy".into());
            Ok(())
        }

        async fn put_object(
            &self,
            key: &str,
            body: Vec<u8>,
            content_type: &str,
            metadata: &BTreeMap<String, String>,
        ) -> Result<(), StorageError> {
            assert_eq!(content_type, "application/pdf");
            self.objects
                .lock()
                .unwrap()
                .push((key.into(), body, metadata.clone()));
            Ok(())
        }

        async fn list_objects(&self) -> Result<Vec<ObjectInfo>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn pdf(id: &str, name: &str) -> DriveFile {
        DriveFile {
            id: id.into(),
            name: name.into(),
            mime_type: Some("application/pdf".into()),
            created_time: Some("2024-01-01T00:00:00Z".into()),
            modified_time: Some("2024-01-02T00:00:00Z".into()),
            size: Some("10".into()),
            owners: vec![DriveUser {
                display_name: Some("Owner".into()),
                ..DriveUser::default()
            }],
            last_modifying_user: None,
        }
    }

    fn scopes(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn tree() -> FakeDrive {
        FakeDrive::default()
            .folder("root", "scope", "Scope")
            .folder("root", "skip", "Private")
            .pdf("scope", "f1", "top.pdf")
            .folder("scope", "med", "Medicine")
            .folder("scope", "law", "Law")
            .pdf("med", "f2", "plan.pdf")
            .folder("med", "y24", "2024")
            .pdf("y24", "f3", "deep file.pdf")
            .pdf("law", "f4", "act.pdf")
            .pdf("skip", "f5", "secret.pdf")
    }

    #[tokio::test]
    async fn walks_files_before_subfolders_in_listing_order() {
        let walker = IngestionWalker::new(tree(), FakeStore::default());

        let report = walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Continue)
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(
            report.uploaded,
            vec![
                "Scope/top.pdf",
                "Scope/Medicine/plan.pdf",
                "Scope/Medicine/2024/deepfile.pdf",
                "Scope/Law/act.pdf",
            ]
        );
        let objects = walker.store.objects.lock().unwrap();
        assert_eq!(objects[0].1, b"%PDF f1");
        assert_eq!(objects[0].2["author_name"], "Owner");
        assert!(!objects[0].2.contains_key("location"));
    }

    #[tokio::test]
    async fn bucket_is_created_once_per_walk() {
        let walker = IngestionWalker::new(tree(), FakeStore::default());

        walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Continue)
            .await
            .unwrap();

        assert_eq!(
            *walker.store.calls.lock().unwrap(),
            vec!["exists", "make", "policy"]
        );
    }

    #[tokio::test]
    async fn existing_bucket_is_left_alone() {
        let store = FakeStore {
            exists: true,
            ..FakeStore::default()
        };
        let walker = IngestionWalker::new(tree(), store);

        walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Continue)
            .await
            .unwrap();

        assert_eq!(*walker.store.calls.lock().unwrap(), vec!["exists"]);
    }

    #[tokio::test]
    async fn failures_are_recorded_and_siblings_continue() {
        let mut drive = tree().broken("med").broken("f4");
        drive.pdfs.get_mut("scope").unwrap()[0].owners.clear();
        let walker = IngestionWalker::new(drive, FakeStore::default());

        let report = walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Continue)
            .await
            .unwrap();

        assert!(report.uploaded.is_empty());
        let paths: Vec<&str> = report
            .failures
            .iter()
            .map(|failure| failure.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "Scope/top.pdf",
                "Scope/Medicine",
                "Scope/Medicine",
                "Scope/Law/act.pdf"
            ]
        );
        assert!(matches!(
            report.failures[0].error,
            IngestError::Metadata(MetadataError::NoOwner)
        ));
        assert!(matches!(report.failures[1].error, IngestError::Drive(_)));
    }

    #[tokio::test]
    async fn abort_policy_returns_first_failure() {
        let drive = tree().broken("f2");
        let walker = IngestionWalker::new(drive, FakeStore::default());

        let error = walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Abort)
            .await
            .unwrap_err();

        assert!(matches!(error, IngestError::Drive(_)));
        assert_eq!(walker.store.objects.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn root_listing_failure_is_an_error() {
        let walker = IngestionWalker::new(tree().broken("root"), FakeStore::default());

        let result = walker
            .run("root", &scopes(&["Scope"]), FailurePolicy::Continue)
            .await;

        assert!(matches!(result, Err(IngestError::Drive(_))));
        assert!(walker.store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unscoped_roots_are_skipped() {
        let walker = IngestionWalker::new(tree(), FakeStore::default());

        let report = walker
            .run("root", &scopes(&["Nothing"]), FailurePolicy::Continue)
            .await
            .unwrap();

        assert!(report.uploaded.is_empty());
        assert!(report.is_clean());
        assert!(walker.store.calls.lock().unwrap().is_empty());
    }
}
