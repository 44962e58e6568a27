//! Search service backing the HTTP API.

use std::sync::Arc;

use async_trait::async_trait;

use super::{NeuralSearcher, SearchError, SearchRequest, SearchResult, Searcher, TextSearcher};
use crate::health::{HealthChecker, HealthReport};
use crate::storage::{ObjectStore, StorageError};

/// Operations exposed over HTTP.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Run a neural or text search, fanned out over the requested locations.
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchResult>, SearchError>;

    /// Distinct faculty names present in the document bucket.
    async fn faculties(&self) -> Result<Vec<String>, StorageError>;

    /// Probe the backing services.
    async fn health(&self) -> HealthReport;
}

/// Production [`SearchApi`] wired to Qdrant, the embedding provider and MinIO.
pub struct SearchService {
    neural: NeuralSearcher,
    text: TextSearcher,
    store: Arc<dyn ObjectStore>,
    health: HealthChecker,
}

impl SearchService {
    /// Assemble the service from already constructed components.
    pub fn new(
        neural: NeuralSearcher,
        text: TextSearcher,
        store: Arc<dyn ObjectStore>,
        health: HealthChecker,
    ) -> Self {
        Self {
            neural,
            text,
            store,
            health,
        }
    }
}

#[async_trait]
impl SearchApi for SearchService {
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchResult>, SearchError> {
        let searcher: &dyn Searcher = if request.neural {
            &self.neural
        } else {
            &self.text
        };
        let results = searcher
            .search(&request.query, request.locations.as_deref(), request.top)
            .await?;
        tracing::debug!(neural = request.neural, query = %request.query, "Search request served");
        Ok(results)
    }

    async fn faculties(&self) -> Result<Vec<String>, StorageError> {
        self.store.faculties().await
    }

    async fn health(&self) -> HealthReport {
        self.health.check().await
    }
}
