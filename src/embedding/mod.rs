use crate::config::{EmbeddingProvider, EmbeddingSettings};
use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider endpoint could not be parsed.
    #[error("Invalid embedding provider URL: {0}")]
    InvalidUrl(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Sentence-embedding model served by a local Ollama runtime.
pub struct OllamaEmbeddingClient {
    inner: Ollama,
    model: String,
}

impl OllamaEmbeddingClient {
    /// Connect to the Ollama runtime at `url` using `model` for embeddings.
    pub fn new(url: &str, model: impl Into<String>) -> Result<Self, EmbeddingClientError> {
        let inner =
            Ollama::try_new(url).map_err(|err| EmbeddingClientError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            inner,
            model: model.into(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(model = %self.model, inputs = texts.len(), "Generating embeddings");
        let request =
            GenerateEmbeddingsRequest::new(self.model.clone(), EmbeddingsInput::Multiple(texts));
        let response = self
            .inner
            .generate_embeddings(request)
            .await
            .map_err(|err| EmbeddingClientError::GenerationFailed(err.to_string()))?;
        Ok(response.embeddings)
    }
}

/// Deterministic embedding client that hashes bytes into a normalized vector.
///
/// Useful for running the service without a model runtime; similarity scores are meaningless.
pub struct HashEmbeddingClient {
    dimension: usize,
}

impl HashEmbeddingClient {
    /// Construct a client producing vectors of `dimension` components.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = idx % dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|text| Self::encode(text, self.dimension))
            .collect())
    }
}

/// Build the embedding client selected by the configuration.
pub fn build_embedding_client(
    settings: &EmbeddingSettings,
) -> Result<Box<dyn EmbeddingClient>, EmbeddingClientError> {
    tracing::info!(
        provider = ?settings.provider,
        model = %settings.model,
        dimension = settings.dimension,
        "Initializing embedding client"
    );
    match settings.provider {
        EmbeddingProvider::Ollama => Ok(Box::new(OllamaEmbeddingClient::new(
            &settings.ollama_url,
            settings.model.clone(),
        )?)),
        EmbeddingProvider::Hash => Ok(Box::new(HashEmbeddingClient::new(settings.dimension))),
    }
}
