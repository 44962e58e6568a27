//! Result and error types shared by the neural and text searchers.

use crate::{embedding::EmbeddingClientError, qdrant::QdrantError};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors emitted while running a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Embedding provider failed to return vectors for the query text.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Qdrant request returned an error response or could not be sent.
    #[error("Qdrant request failed: {0}")]
    Qdrant(#[from] QdrantError),
    /// Returned embedding dimension does not match configuration.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension configured on the server.
        expected: usize,
        /// Actual embedding dimension produced by the provider.
        actual: usize,
    },
    /// Embedding provider returned no vectors.
    #[error("Embedding provider returned no vectors for the query")]
    EmptyEmbedding,
}

/// Relevance of a hit: a similarity value, or nothing for exact-text matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Similarity reported by the vector query.
    Similarity(f32),
    /// Text matches carry no score; serialized as `"N/A"`.
    NotApplicable,
}

impl Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Similarity(value) => serializer.serialize_f32(*value),
            Self::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

/// One hit returned to API consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Stored payload of the matching record.
    pub payload: Map<String, Value>,
    /// Similarity score, or `N/A` for text matches.
    pub score: Score,
}

/// Parameters of one search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Use the embedding searcher when true, the text searcher otherwise.
    pub neural: bool,
    /// Optional ordered list of location filters; each gets its own query.
    pub locations: Option<Vec<String>>,
    /// Result cap applied per location.
    pub top: usize,
}
