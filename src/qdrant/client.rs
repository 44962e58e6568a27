//! Read-only Qdrant REST client used by the search paths and health probe.

use crate::config::QdrantSettings;
use crate::qdrant::types::{
    CollectionList, Envelope, PointPage, QdrantError, RawPoint, ScoredPoint, StoredPoint,
};
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};

/// Cloneable handle to one Qdrant endpoint, with optional API key.
#[derive(Clone)]
pub struct QdrantService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl QdrantService {
    /// Construct a new client from explicit connection settings.
    pub fn new(settings: &QdrantSettings) -> Result<Self, QdrantError> {
        let client = Client::builder().user_agent("docsearch/0.1").build()?;

        let base_url = normalize_base_url(&settings.url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = settings.api_key.as_deref().is_some_and(|key| !key.is_empty()),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
        })
    }

    /// Names of every collection on the server.
    pub async fn list_collections(&self) -> Result<Vec<String>, QdrantError> {
        let response = self.request(Method::GET, "collections").send().await?;
        let response = self.ensure_success(response, "list collections").await?;
        let Envelope { result } = response.json::<Envelope<CollectionList>>().await?;
        Ok(result
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    /// Rank points by similarity to `vector`, returning at most `limit` scored payloads.
    pub async fn query_points(
        &self,
        collection_name: &str,
        vector: &[f32],
        filter: Option<Value>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, QdrantError> {
        let mut body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });
        if let (Some(filter_value), Some(obj)) = (filter, body.as_object_mut()) {
            obj.insert("filter".into(), filter_value);
        }

        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/query"),
            )
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response, "query points").await?;

        let Envelope { result } = response.json::<Envelope<PointPage>>().await?;
        let results = result
            .into_points()
            .into_iter()
            .map(|point| {
                let score = point.score.unwrap_or_default();
                let (id, payload) = split_point(point);
                ScoredPoint { id, score, payload }
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            collection = collection_name,
            hits = results.len(),
            limit,
            "Similarity query completed"
        );
        Ok(results)
    }

    /// Fetch the first page of points matching `filter`, in store order, without vectors.
    pub async fn scroll_points(
        &self,
        collection_name: &str,
        filter: Value,
        limit: usize,
    ) -> Result<Vec<StoredPoint>, QdrantError> {
        let body = json!({
            "filter": filter,
            "limit": limit,
            "with_payload": true,
            "with_vector": false,
        });

        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/scroll"),
            )
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response, "scroll points").await?;

        let Envelope { result } = response.json::<Envelope<PointPage>>().await?;
        let results = result
            .into_points()
            .into_iter()
            .map(|point| {
                let (id, payload) = split_point(point);
                StoredPoint { id, payload }
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            collection = collection_name,
            hits = results.len(),
            limit,
            "Text scroll completed"
        );
        Ok(results)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        req
    }

    async fn ensure_success(
        &self,
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, QdrantError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = QdrantError::UnexpectedStatus { status, body };
        tracing::error!(operation, error = %error, "Qdrant request failed");
        Err(error)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Point ids are either unsigned integers or UUID strings; both become plain strings.
fn split_point(point: RawPoint) -> (String, Map<String, Value>) {
    let id = match point.id {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    (id, point.payload.unwrap_or_default())
}
