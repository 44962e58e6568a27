//! Qdrant vector store integration.

pub mod client;
pub mod filters;
pub mod types;

pub use client::QdrantService;
pub use filters::{content_filter, location_filter};
pub use types::{QdrantError, ScoredPoint, StoredPoint};
