//! Liveness probes for the backing services.

use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;

use crate::config::DatabaseSettings;
use crate::qdrant::QdrantService;
use crate::storage::MinioClient;

const DATABASE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of probing one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeStatus {
    /// Whether the service answered.
    pub reachable: bool,
    /// Extra context: collection count on success, the error otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeStatus {
    fn up(detail: Option<String>) -> Self {
        Self {
            reachable: true,
            detail,
        }
    }

    fn down(error: impl ToString) -> Self {
        Self {
            reachable: false,
            detail: Some(error.to_string()),
        }
    }
}

/// Probe results for every backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Vector database.
    pub qdrant: ProbeStatus,
    /// MinIO.
    pub object_store: ProbeStatus,
    /// Relational database.
    pub database: ProbeStatus,
}

impl HealthReport {
    /// `true` when every probe succeeded.
    pub fn all_reachable(&self) -> bool {
        self.qdrant.reachable && self.object_store.reachable && self.database.reachable
    }
}

/// Runs the probes against injected clients.
#[derive(Clone)]
pub struct HealthChecker {
    qdrant: QdrantService,
    store: MinioClient,
    database: DatabaseSettings,
}

impl HealthChecker {
    /// Probe the given Qdrant, MinIO and database endpoints.
    pub fn new(qdrant: QdrantService, store: MinioClient, database: DatabaseSettings) -> Self {
        Self {
            qdrant,
            store,
            database,
        }
    }

    /// Probe every service once, in order.
    pub async fn check(&self) -> HealthReport {
        let report = HealthReport {
            qdrant: probe_qdrant(&self.qdrant).await,
            object_store: probe_object_store(&self.store).await,
            database: probe_database(&self.database).await,
        };
        tracing::info!(
            qdrant = report.qdrant.reachable,
            object_store = report.object_store.reachable,
            database = report.database.reachable,
            "Health check completed"
        );
        report
    }
}

/// List collections as a liveness signal.
pub async fn probe_qdrant(qdrant: &QdrantService) -> ProbeStatus {
    match qdrant.list_collections().await {
        Ok(collections) => ProbeStatus::up(Some(format!("{} collections", collections.len()))),
        Err(error) => {
            tracing::warn!(error = %error, "Qdrant is unreachable");
            ProbeStatus::down(error)
        }
    }
}

/// Hit MinIO's liveness endpoint.
pub async fn probe_object_store(store: &MinioClient) -> ProbeStatus {
    match store.health_check().await {
        Ok(()) => ProbeStatus::up(None),
        Err(error) => {
            tracing::warn!(error = %error, "Object store is unreachable");
            ProbeStatus::down(error)
        }
    }
}

/// Open a TCP connection to the database port.
pub async fn probe_database(settings: &DatabaseSettings) -> ProbeStatus {
    let address = format!("{}:{}", settings.host, settings.port);
    match tokio::time::timeout(DATABASE_CONNECT_TIMEOUT, TcpStream::connect(&address)).await {
        Ok(Ok(_)) => ProbeStatus::up(None),
        Ok(Err(error)) => {
            tracing::warn!(address = %address, error = %error, "Database is unreachable");
            ProbeStatus::down(error)
        }
        Err(_) => {
            tracing::warn!(address = %address, "Database connection timed out");
            ProbeStatus::down(format!("timed out connecting to {address}"))
        }
    }
}
