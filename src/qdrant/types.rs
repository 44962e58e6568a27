//! Qdrant errors, public point types and the REST response shapes they are decoded from.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failures talking to Qdrant.
#[derive(Debug, Error)]
pub enum QdrantError {
    /// `QDRANT_URL` is not a valid URL.
    #[error("Invalid Qdrant URL: {0}")]
    InvalidUrl(String),
    /// Transport error before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx answer.
    #[error("Unexpected Qdrant response ({status}): {body}")]
    UnexpectedStatus {
        /// Status code Qdrant answered with.
        status: StatusCode,
        /// Raw response text.
        body: String,
    },
}

/// A hit from `points/query`, highest similarity first.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// Point id rendered as a string (numeric ids included).
    pub id: String,
    /// Similarity to the query vector.
    pub score: f32,
    /// Indexed document fields.
    pub payload: Map<String, Value>,
}

/// A point from `points/scroll`; scrolling yields no score.
#[derive(Debug, Clone)]
pub struct StoredPoint {
    /// Point id rendered as a string.
    pub id: String,
    /// Indexed document fields.
    pub payload: Map<String, Value>,
}

/// Every Qdrant reply wraps its data in `{"result": ...}`.
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) result: T,
}

#[derive(Deserialize)]
pub(crate) struct CollectionList {
    pub(crate) collections: Vec<NamedCollection>,
}

#[derive(Deserialize)]
pub(crate) struct NamedCollection {
    pub(crate) name: String,
}

/// `points/query` answers with a bare array on older servers and `{"points": [...]}` on newer.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum PointPage {
    Bare(Vec<RawPoint>),
    Wrapped {
        #[serde(default)]
        points: Vec<RawPoint>,
    },
}

impl PointPage {
    pub(crate) fn into_points(self) -> Vec<RawPoint> {
        match self {
            Self::Bare(points) | Self::Wrapped { points } => points,
        }
    }
}

/// Point as serialized by both query and scroll; scroll omits `score`.
#[derive(Deserialize)]
pub(crate) struct RawPoint {
    #[serde(default)]
    pub(crate) id: Option<Value>,
    #[serde(default)]
    pub(crate) score: Option<f32>,
    #[serde(default)]
    pub(crate) payload: Option<Map<String, Value>>,
}
