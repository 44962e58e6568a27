//! HTTP surface for document search.
//!
//! - `GET /api/search` – Neural or text search. Query parameters: `q` (required),
//!   `neural` (bool, default `true`), `location` (repeatable folder filter) and `top`
//!   (per-location cap, defaults to `SEARCH_DEFAULT_TOP`). Responds with `{"result": [...]}`.
//! - `GET /api/faculties` – Distinct faculty names found in the document bucket.
//! - `GET /api/health` – Reachability of Qdrant, MinIO and the database.
//!
//! Every route is served with a permissive CORS policy so the browser frontend can call it
//! from another origin.

use crate::health::HealthReport;
use crate::search::{SearchApi, SearchError, SearchRequest, SearchResult};
use crate::storage::StorageError;
use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the HTTP router exposing the search API.
///
/// `default_top` caps each location's results when a search omits `top`.
pub fn create_router<S>(service: Arc<S>, default_top: usize) -> Router
where
    S: SearchApi + 'static,
{
    Router::new()
        .route("/api/search", get(search::<S>))
        .route("/api/faculties", get(list_faculties::<S>))
        .route("/api/health", get(health::<S>))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            service,
            default_top,
        })
}

struct AppState<S> {
    service: Arc<S>,
    default_top: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            default_top: self.default_top,
        }
    }
}

#[derive(Serialize)]
struct SearchResponse {
    result: Vec<SearchResult>,
}

/// Run a search described by the query string.
async fn search<S>(
    State(state): State<AppState<S>>,
    RawQuery(query): RawQuery,
) -> Result<Json<SearchResponse>, AppError>
where
    S: SearchApi,
{
    let request = parse_search_query(query.as_deref().unwrap_or_default(), state.default_top)?;
    let result = state.service.search(request).await?;
    Ok(Json(SearchResponse { result }))
}

#[derive(Serialize)]
struct FacultiesResponse {
    faculties: Vec<String>,
}

async fn list_faculties<S>(
    State(state): State<AppState<S>>,
) -> Result<Json<FacultiesResponse>, AppError>
where
    S: SearchApi,
{
    let faculties = state.service.faculties().await?;
    Ok(Json(FacultiesResponse { faculties }))
}

async fn health<S>(State(state): State<AppState<S>>) -> Json<HealthReport>
where
    S: SearchApi,
{
    Json(state.service.health().await)
}

/// Decode `q`, `neural`, repeated `location` and `top` from a raw query string.
fn parse_search_query(raw: &str, default_top: usize) -> Result<SearchRequest, AppError> {
    let mut query = None;
    let mut neural = true;
    let mut locations: Option<Vec<String>> = None;
    let mut top = default_top;

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "q" => query = Some(value.into_owned()),
            "neural" => {
                neural = parse_bool(&value).ok_or_else(|| {
                    AppError::InvalidQuery(format!("`neural` must be a boolean, got {value:?}"))
                })?;
            }
            "location" => locations.get_or_insert_with(Vec::new).push(value.into_owned()),
            "top" => {
                top = value.trim().parse().map_err(|_| {
                    AppError::InvalidQuery(format!(
                        "`top` must be a non-negative integer, got {value:?}"
                    ))
                })?;
            }
            _ => {}
        }
    }

    let query = query
        .ok_or_else(|| AppError::InvalidQuery("missing required query parameter `q`".into()))?;
    Ok(SearchRequest {
        query,
        neural,
        locations,
        top,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

enum AppError {
    InvalidQuery(String),
    Search(SearchError),
    Storage(StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidQuery(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            Self::Search(error) => {
                tracing::error!(error = %error, "Search request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
            }
            Self::Storage(error) => {
                tracing::error!(error = %error, "Faculty listing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
            }
        }
    }
}

impl From<SearchError> for AppError {
    fn from(inner: SearchError) -> Self {
        Self::Search(inner)
    }
}

impl From<StorageError> for AppError {
    fn from(inner: StorageError) -> Self {
        Self::Storage(inner)
    }
}
