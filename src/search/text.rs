//! Full-text match search over the `content` payload field.

use async_trait::async_trait;

use super::{
    Searcher,
    fanout::fan_out,
    types::{Score, SearchError, SearchResult},
};
use crate::qdrant::{QdrantService, content_filter};

/// Returns chunks whose content contains the query, in store order and without scores.
pub struct TextSearcher {
    qdrant: QdrantService,
    collection: String,
}

impl TextSearcher {
    /// Build a text searcher over `collection`.
    pub fn new(qdrant: QdrantService, collection: impl Into<String>) -> Self {
        Self {
            qdrant,
            collection: collection.into(),
        }
    }

    async fn query_location(
        &self,
        query: &str,
        location: Option<&str>,
        top: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let points = self
            .qdrant
            .scroll_points(&self.collection, content_filter(query, location), top)
            .await?;
        Ok(points
            .into_iter()
            .map(|point| SearchResult {
                payload: point.payload,
                score: Score::NotApplicable,
            })
            .collect())
    }
}

#[async_trait]
impl Searcher for TextSearcher {
    async fn search(
        &self,
        query: &str,
        locations: Option<&[String]>,
        top: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let results = fan_out(locations, move |location| {
            self.query_location(query, location, top)
        })
        .await?;
        tracing::info!(
            collection = %self.collection,
            locations = locations.map_or(0, <[String]>::len),
            top,
            results = results.len(),
            "Text search completed"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QdrantSettings;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn searcher(server: &MockServer) -> TextSearcher {
        let qdrant = QdrantService::new(&QdrantSettings {
            url: server.base_url(),
            collection_name: Some("documents".into()),
            api_key: None,
        })
        .expect("qdrant client");
        TextSearcher::new(qdrant, "documents")
    }

    #[tokio::test]
    async fn scoped_text_search_requires_content_and_location_matches() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll")
                    .json_body(json!({
                        "filter": {
                            "must": [
                                { "key": "content", "match": { "text": "อาชีพ" } },
                                { "key": "location", "match": { "text": "คณะแพทยศาสตร์" } }
                            ]
                        },
                        "limit": 10,
                        "with_payload": true,
                        "with_vector": false
                    }));
                then.status(200).json_body(json!({
                    "result": {
                        "points": [
                            { "id": 1, "payload": {
                                "content": "แนวทางอาชีพ",
                                "location": "2. งานหลักสูตร/คณะแพทยศาสตร์/a.pdf"
                            } },
                            { "id": 2, "payload": {
                                "content": "อาชีพแพทย์",
                                "location": "2. งานหลักสูตร/คณะแพทยศาสตร์/b.pdf"
                            } }
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        let locations = vec!["คณะแพทยศาสตร์".to_string()];
        let results = searcher(&server)
            .search("อาชีพ", Some(&locations), 10)
            .await
            .expect("results");

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.score, Score::NotApplicable);
            let content = result.payload["content"].as_str().unwrap_or_default();
            let location = result.payload["location"].as_str().unwrap_or_default();
            assert!(content.contains("อาชีพ"));
            assert!(location.contains("คณะแพทยศาสตร์"));
        }
    }

    #[tokio::test]
    async fn unscoped_text_search_only_matches_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll")
                    .json_body(json!({
                        "filter": {
                            "must": [ { "key": "content", "match": { "text": "career" } } ]
                        },
                        "limit": 3,
                        "with_payload": true,
                        "with_vector": false
                    }));
                then.status(200).json_body(json!({ "result": { "points": [] } }));
            })
            .await;

        let results = searcher(&server)
            .search("career", None, 3)
            .await
            .expect("results");

        mock.assert_async().await;
        assert!(results.is_empty());
    }
}
