//! Per-location fan-out with order-preserving concatenation.
//!
//! A search scoped to several locations runs one query per location, in the order given, each
//! capped at the caller's `top`. Results are appended as they arrive: all hits for the first
//! location, then all hits for the second, and so on. The merged list is neither re-capped nor
//! re-ranked, so its length is at most `locations.len() * top`.

use std::future::Future;

use super::types::{SearchError, SearchResult};

/// Run `query` once unscoped, or once per location, concatenating the results.
///
/// `None` and an empty list both mean "no location filter". The first failing query fails the
/// whole call; queries after it are not issued.
pub async fn fan_out<'a, F, Fut>(
    locations: Option<&'a [String]>,
    mut query: F,
) -> Result<Vec<SearchResult>, SearchError>
where
    F: FnMut(Option<&'a str>) -> Fut,
    Fut: Future<Output = Result<Vec<SearchResult>, SearchError>>,
{
    let Some(locations) = locations.filter(|locations| !locations.is_empty()) else {
        return query(None).await;
    };

    let mut merged = Vec::new();
    for location in locations {
        let hits = query(Some(location.as_str())).await?;
        tracing::debug!(location = %location, hits = hits.len(), "Location query completed");
        merged.extend(hits);
    }
    Ok(merged)
}
