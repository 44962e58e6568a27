//! S3-compatible HTTP client for MinIO.

use std::collections::BTreeMap;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_core::Stream;
use futures_util::TryStreamExt;
use reqwest::{Client, Method, StatusCode, Url, header::AUTHORIZATION};
use serde_json::json;
use time::OffsetDateTime;

use super::signing::{
    SigningParams, amz_date, authorization, canonical_query, hex_sha256, uri_encode,
};
use super::types::{ListBucketResult, ObjectInfo, StorageError};
use super::ObjectStore;
use crate::config::MinioSettings;

const METADATA_PREFIX: &str = "x-amz-meta-";

/// MinIO client bound to a single bucket.
#[derive(Clone)]
pub struct MinioClient {
    client: Client,
    base_url: String,
    host: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    region: String,
    policy: Option<String>,
}

impl MinioClient {
    /// Construct a client for the bucket named in `settings`.
    pub fn new(settings: &MinioSettings) -> Result<Self, StorageError> {
        let client = Client::builder().user_agent("docsearch/0.1").build()?;
        let url = Url::parse(&settings.endpoint)
            .map_err(|err| StorageError::InvalidEndpoint(err.to_string()))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(StorageError::InvalidEndpoint(settings.endpoint.clone())),
        };
        let base_url = format!("{}://{host}", url.scheme());
        tracing::debug!(endpoint = %base_url, bucket = %settings.bucket, "Initialized object store client");

        Ok(Self {
            client,
            base_url,
            host,
            bucket: settings.bucket.clone(),
            access_key: settings.access_key.clone(),
            secret_key: settings.secret_key.clone(),
            region: settings.region.clone(),
            policy: settings.bucket_policy.clone(),
        })
    }

    /// Return a copy of this client targeting another bucket.
    pub fn with_bucket(&self, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..self.clone()
        }
    }

    /// Probe the unauthenticated liveness endpoint.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        let response = self
            .client
            .get(format!("{}/minio/health/live", self.base_url))
            .send()
            .await?;
        ensure_success(response, "health check").await.map(drop)
    }

    /// Stream every object in the bucket, following continuation tokens.
    pub fn stream_objects<'a>(
        &'a self,
        prefix: Option<&'a str>,
    ) -> impl Stream<Item = Result<ObjectInfo, StorageError>> + Send + 'a {
        try_stream! {
            let mut token: Option<String> = None;
            loop {
                let mut query = vec![("list-type", "2")];
                if let Some(prefix) = prefix {
                    query.push(("prefix", prefix));
                }
                if let Some(token) = token.as_deref() {
                    query.push(("continuation-token", token));
                }

                let response = self
                    .send(Method::GET, None, &query, Vec::new(), Vec::new())
                    .await?;
                let response = ensure_success(response, "list objects").await?;
                let text = response.text().await?;
                let page: ListBucketResult = quick_xml::de::from_str(&text)
                    .map_err(|err| StorageError::InvalidResponse(err.to_string()))?;

                let next = page.next_continuation_token.filter(|_| page.is_truncated);
                for object in page.contents {
                    yield object;
                }

                match next {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        key: Option<&str>,
        query: &[(&str, &str)],
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, StorageError> {
        let mut canonical_uri = format!("/{}", uri_encode(&self.bucket, true));
        if let Some(key) = key {
            canonical_uri.push('/');
            canonical_uri.push_str(&uri_encode(key, false));
        }
        let canonical_query = canonical_query(query);
        let mut url = format!("{}{canonical_uri}", self.base_url);
        if !canonical_query.is_empty() {
            url.push('?');
            url.push_str(&canonical_query);
        }

        let payload_hash = hex_sha256(&body);
        let timestamp = OffsetDateTime::now_utc();
        let mut signed = BTreeMap::new();
        signed.insert("host".to_string(), self.host.clone());
        signed.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        signed.insert("x-amz-date".to_string(), amz_date(timestamp));
        for (name, value) in headers {
            signed.insert(name.to_lowercase(), value);
        }

        let authorization = authorization(&SigningParams {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region,
            method: method.as_str(),
            canonical_uri: &canonical_uri,
            canonical_query: &canonical_query,
            headers: &signed,
            payload_hash: &payload_hash,
            timestamp,
        });

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization);
        for (name, value) in signed.iter().filter(|(name, _)| name.as_str() != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        Ok(request.body(body).send().await?)
    }
}

#[async_trait]
impl ObjectStore for MinioClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn bucket_policy(&self) -> String {
        self.policy
            .clone()
            .unwrap_or_else(|| public_read_policy(&self.bucket))
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        let response = self
            .send(Method::HEAD, None, &[], Vec::new(), Vec::new())
            .await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => ensure_success(response, "bucket exists").await.map(|_| false),
        }
    }

    async fn make_bucket(&self) -> Result<(), StorageError> {
        let response = self
            .send(Method::PUT, None, &[], Vec::new(), Vec::new())
            .await?;
        ensure_success(response, "make bucket").await?;
        tracing::debug!(bucket = %self.bucket, "Bucket created");
        Ok(())
    }

    async fn set_bucket_policy(&self, policy: &str) -> Result<(), StorageError> {
        let response = self
            .send(
                Method::PUT,
                None,
                &[("policy", "")],
                vec![("content-type".into(), "application/json".into())],
                policy.as_bytes().to_vec(),
            )
            .await?;
        ensure_success(response, "set bucket policy").await?;
        tracing::debug!(bucket = %self.bucket, "Bucket policy set");
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        let mut headers = vec![("content-type".to_string(), content_type.to_string())];
        headers.extend(metadata.iter().map(|(name, value)| {
            (
                format!("{METADATA_PREFIX}{}", name.to_lowercase()),
                header_safe(value),
            )
        }));
        let size = body.len();

        let response = self
            .send(Method::PUT, Some(key), &[], headers, body)
            .await?;
        ensure_success(response, "put object").await?;
        tracing::debug!(bucket = %self.bucket, key, size, "Object stored");
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<ObjectInfo>, StorageError> {
        self.stream_objects(None).try_collect().await
    }
}

/// Bucket policy granting anonymous read access to every object.
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetBucketLocation", "s3:ListBucket"],
                "Resource": [format!("arn:aws:s3:::{bucket}")]
            },
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")]
            }
        ]
    })
    .to_string()
}

/// Metadata travels in HTTP headers; values outside printable ASCII are percent-encoded.
fn header_safe(value: &str) -> String {
    if value.bytes().all(|byte| (0x20..0x7f).contains(&byte)) {
        value.to_string()
    } else {
        uri_encode(value, true)
    }
}

async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, StorageError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let error = StorageError::UnexpectedStatus { status, body };
    tracing::error!(operation, error = %error, "Object store request failed");
    Err(error)
}
