//! Drive-to-object-store ingestion.

pub mod metadata;
pub mod sanitize;
pub mod walker;

pub use metadata::{FileMetadata, MetadataError};
pub use sanitize::sanitize_filename;
pub use walker::{FailurePolicy, IngestError, IngestFailure, IngestReport, IngestionWalker};
