//! Embedding-based similarity search.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    Searcher,
    fanout::fan_out,
    types::{Score, SearchError, SearchResult},
};
use crate::{
    embedding::EmbeddingClient,
    qdrant::{QdrantService, location_filter},
};

/// Ranks indexed chunks by vector similarity to the embedded query.
pub struct NeuralSearcher {
    qdrant: QdrantService,
    embedding: Arc<dyn EmbeddingClient>,
    collection: String,
    dimension: usize,
}

impl NeuralSearcher {
    /// Build a searcher over `collection` expecting `dimension`-sized query vectors.
    pub fn new(
        qdrant: QdrantService,
        embedding: Arc<dyn EmbeddingClient>,
        collection: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            qdrant,
            embedding,
            collection: collection.into(),
            dimension,
        }
    }

    async fn embed(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        let mut vectors = self
            .embedding
            .generate_embeddings(vec![query.to_string()])
            .await?;
        let vector = vectors.pop().ok_or(SearchError::EmptyEmbedding)?;

        let actual = vector.len();
        if actual != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(vector)
    }

    async fn query_location(
        &self,
        vector: &[f32],
        location: Option<&str>,
        top: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let hits = self
            .qdrant
            .query_points(&self.collection, vector, location_filter(location), top)
            .await?;
        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                payload: hit.payload,
                score: Score::Similarity(hit.score),
            })
            .collect())
    }
}

#[async_trait]
impl Searcher for NeuralSearcher {
    async fn search(
        &self,
        query: &str,
        locations: Option<&[String]>,
        top: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let vector = self.embed(query).await?;
        let vector = vector.as_slice();
        let results = fan_out(locations, move |location| {
            self.query_location(vector, location, top)
        })
        .await?;
        tracing::info!(
            collection = %self.collection,
            locations = locations.map_or(0, <[String]>::len),
            top,
            results = results.len(),
            "Neural search completed"
        );
        Ok(results)
    }
}
