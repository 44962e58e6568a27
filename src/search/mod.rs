//! Neural and text search over the indexed document collection.

pub mod fanout;
pub mod neural;
mod service;
pub mod text;
pub mod types;

use async_trait::async_trait;

pub use fanout::fan_out;
pub use neural::NeuralSearcher;
pub use service::{SearchApi, SearchService};
pub use text::TextSearcher;
pub use types::{Score, SearchError, SearchRequest, SearchResult};

/// A query strategy that can be scoped per location.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Run `query`, once unscoped or once per location, with `top` results per query.
    async fn search(
        &self,
        query: &str,
        locations: Option<&[String]>,
        top: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
