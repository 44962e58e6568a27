#![deny(missing_docs)]

//! Core library for the docsearch backend: Drive-to-MinIO ingestion plus neural and text
//! search over a Qdrant collection.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Google Drive source listing and download.
pub mod drive;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Liveness probes for backing services.
pub mod health;
/// Drive-to-object-store ingestion pipeline.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Qdrant vector store integration.
pub mod qdrant;
/// Neural and text search.
pub mod search;
/// MinIO object storage integration.
pub mod storage;
