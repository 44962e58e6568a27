use anyhow::{Context, Result};
use docsearch::{
    api, config, embedding,
    health::HealthChecker,
    logging,
    qdrant::QdrantService,
    search::{NeuralSearcher, SearchService, TextSearcher},
    storage::MinioClient,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing("docsearch");
    let config = config::init_config().context("Failed to load configuration")?;
    let collection = config.qdrant.require_collection()?;

    let embedding: Arc<dyn embedding::EmbeddingClient> =
        embedding::build_embedding_client(&config.embedding)
            .context("Failed to initialize embedding client")?
            .into();
    let qdrant = QdrantService::new(&config.qdrant).context("Failed to initialize Qdrant client")?;
    let store =
        MinioClient::new(&config.minio).context("Failed to initialize object store client")?;

    let service = SearchService::new(
        NeuralSearcher::new(
            qdrant.clone(),
            embedding,
            collection,
            config.embedding.dimension,
        ),
        TextSearcher::new(qdrant.clone(), collection),
        Arc::new(store.clone()),
        HealthChecker::new(qdrant, store, config.database.clone()),
    );
    let app = api::create_router(Arc::new(service), config.search_default_top);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
