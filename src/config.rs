use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1024;
const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_SEARCH_TOP: usize = 10;
const DEFAULT_MINIO_BUCKET: &str = "document";
const DEFAULT_MINIO_REGION: &str = "us-east-1";
const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_DATABASE_HOST: &str = "localhost";
const DEFAULT_DATABASE_PORT: u16 = 3306;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration shared by the server and the ingestion tooling.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vector database connection settings.
    pub qdrant: QdrantSettings,
    /// Query embedding settings.
    pub embedding: EmbeddingSettings,
    /// Object storage settings.
    pub minio: MinioSettings,
    /// Cloud drive settings used by ingestion.
    pub drive: DriveSettings,
    /// Relational database endpoint, probed for liveness only.
    pub database: DatabaseSettings,
    /// Port the HTTP server listens on.
    pub server_port: u16,
    /// Per-location result cap used when a search omits `top`.
    pub search_default_top: usize,
}

/// Connection settings for Qdrant.
#[derive(Debug, Clone)]
pub struct QdrantSettings {
    /// Base URL of the Qdrant REST API.
    pub url: String,
    /// Collection holding the indexed document chunks; only the search paths need it.
    pub collection_name: Option<String>,
    /// Optional API key sent as the `api-key` header.
    pub api_key: Option<String>,
}

/// Supported embedding backends for query vectorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Local Ollama runtime serving a sentence-embedding model.
    Ollama,
    /// Deterministic byte-hash vectors, for offline development.
    Hash,
}

/// Settings for the embedding model used by neural search.
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    /// Backend producing the vectors.
    pub provider: EmbeddingProvider,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Dimensionality of the produced vectors; must match the collection.
    pub dimension: usize,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
}

/// Settings for the S3-compatible object store.
#[derive(Debug, Clone)]
pub struct MinioSettings {
    /// Endpoint URL including scheme, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// Access key (MinIO root user).
    pub access_key: String,
    /// Secret key (MinIO root password).
    pub secret_key: String,
    /// Bucket receiving ingested documents.
    pub bucket: String,
    /// Region used in request signatures.
    pub region: String,
    /// Optional bucket policy document overriding the public-read default.
    pub bucket_policy: Option<String>,
}

/// Settings for the Google Drive REST API.
#[derive(Debug, Clone)]
pub struct DriveSettings {
    /// Base URL of the Drive v3 API.
    pub api_url: String,
    /// OAuth access token with `drive.readonly` scope.
    pub access_token: Option<String>,
    /// Identifier of the folder whose children are matched against the scopes.
    pub root_folder_id: Option<String>,
    /// Allow-listed top-level folder names.
    pub scopes: Vec<String>,
}

/// Relational database endpoint used by health probes.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Hostname of the database server.
    pub host: String,
    /// TCP port of the database server.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        // Inside compose the services are reached by name instead of localhost.
        let docker = vars.optional("DOCKER_HOST").is_some();
        let service_url = |service: &str, port: u16| {
            let host = if docker { service } else { "localhost" };
            format!("http://{host}:{port}")
        };

        Ok(Self {
            qdrant: QdrantSettings {
                url: vars
                    .optional("QDRANT_URL")
                    .unwrap_or_else(|| service_url("qdrant", 6333)),
                collection_name: vars.optional("QDRANT_COLLECTION_NAME"),
                api_key: vars.optional("QDRANT_API_KEY"),
            },
            embedding: EmbeddingSettings {
                provider: vars
                    .optional("EMBEDDING_PROVIDER")
                    .map(|value| {
                        value
                            .parse()
                            .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".into()))
                    })
                    .transpose()?
                    .unwrap_or(EmbeddingProvider::Ollama),
                model: vars
                    .optional("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
                dimension: vars
                    .parsed("EMBEDDING_DIMENSION")?
                    .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
                ollama_url: vars
                    .optional("OLLAMA_URL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
            },
            minio: MinioSettings {
                endpoint: vars
                    .optional("MINIO_ENDPOINT")
                    .unwrap_or_else(|| service_url("minio", 9000)),
                access_key: vars.required("MINIO_ROOT_USER")?,
                secret_key: vars.required("MINIO_ROOT_PASSWORD")?,
                bucket: vars
                    .optional("MINIO_BUCKET")
                    .unwrap_or_else(|| DEFAULT_MINIO_BUCKET.into()),
                region: vars
                    .optional("MINIO_REGION")
                    .unwrap_or_else(|| DEFAULT_MINIO_REGION.into()),
                bucket_policy: vars.optional("MINIO_BUCKET_POLICY"),
            },
            drive: DriveSettings {
                api_url: vars
                    .optional("GOOGLE_DRIVE_API_URL")
                    .unwrap_or_else(|| DEFAULT_DRIVE_API_URL.into()),
                access_token: vars.optional("GOOGLE_DRIVE_ACCESS_TOKEN"),
                root_folder_id: vars.optional("FOLDER_DRIVE_ID"),
                scopes: vars
                    .optional("INGEST_SCOPES")
                    .map(|value| split_list(&value))
                    .unwrap_or_default(),
            },
            database: DatabaseSettings {
                host: vars.optional("DATABASE_HOST").unwrap_or_else(|| {
                    if docker { "mysql".into() } else { DEFAULT_DATABASE_HOST.into() }
                }),
                port: vars.parsed("DATABASE_PORT")?.unwrap_or(DEFAULT_DATABASE_PORT),
            },
            server_port: vars.parsed("SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
            search_default_top: vars
                .parsed("SEARCH_DEFAULT_TOP")?
                .unwrap_or(DEFAULT_SEARCH_TOP),
        })
    }
}

impl QdrantSettings {
    /// Return the collection name or a missing-variable error for search entry points.
    pub fn require_collection(&self) -> Result<&str, ConfigError> {
        self.collection_name
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable("QDRANT_COLLECTION_NAME".into()))
    }
}

impl DriveSettings {
    /// Return the access token or a missing-variable error for ingestion entry points.
    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable("GOOGLE_DRIVE_ACCESS_TOKEN".into()))
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
///
/// Binaries call this after `logging::init_tracing` so the summary event is recorded.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    config.log_summary();
    Ok(CONFIG.get_or_init(|| config))
}

impl Config {
    /// Emit the resolved endpoints at debug level; credentials are never logged.
    pub fn log_summary(&self) {
        tracing::debug!(
            qdrant_url = %self.qdrant.url,
            collection = ?self.qdrant.collection_name,
            minio_endpoint = %self.minio.endpoint,
            bucket = %self.minio.bucket,
            embedding_provider = ?self.embedding.provider,
            server_port = self.server_port,
            "Loaded configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("QDRANT_COLLECTION_NAME", "documents"),
        ("MINIO_ROOT_USER", "minio"),
        ("MINIO_ROOT_PASSWORD", "minio-secret"),
    ];

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config");
        assert_eq!(config.qdrant.url, "http://localhost:6333");
        assert_eq!(config.qdrant.require_collection().ok(), Some("documents"));
        assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(config.embedding.model, "bge-m3");
        assert_eq!(config.embedding.dimension, 1024);
        assert_eq!(config.minio.bucket, "document");
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.search_default_top, 10);
        assert_eq!(config.database.port, 3306);
        assert!(config.drive.scopes.is_empty());
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let error = Config::from_lookup(lookup(&[("QDRANT_COLLECTION_NAME", "documents")]))
            .expect_err("minio credentials missing");
        assert!(matches!(error, ConfigError::MissingVariable(key) if key == "MINIO_ROOT_USER"));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        let error = Config::from_lookup(lookup(&pairs)).expect_err("invalid port");
        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "SERVER_PORT"));
    }

    #[test]
    fn scopes_are_split_and_trimmed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("INGEST_SCOPES", " first , ,second"));
        pairs.push(("EMBEDDING_PROVIDER", "HASH"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.drive.scopes, vec!["first", "second"]);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Hash);
    }

    #[test]
    fn docker_host_switches_to_service_names() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DOCKER_HOST", "1"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.qdrant.url, "http://qdrant:6333");
        assert_eq!(config.minio.endpoint, "http://minio:9000");
        assert_eq!(config.database.host, "mysql");
    }

    #[test]
    fn collection_is_only_required_by_search() {
        let config = Config::from_lookup(lookup(&REQUIRED[1..])).expect("ingestion config");
        assert!(config.qdrant.collection_name.is_none());
        assert!(matches!(
            config.qdrant.require_collection(),
            Err(ConfigError::MissingVariable(key)) if key == "QDRANT_COLLECTION_NAME"
        ));
    }

    #[test]
    fn summary_is_recorded_once_tracing_is_installed() {
        let buffer = CapturedLogs::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config");
        tracing::subscriber::with_default(subscriber, || config.log_summary());

        let output = buffer.contents();
        assert!(output.contains("Loaded configuration"), "{output}");
        assert!(output.contains("http://localhost:9000"), "{output}");
        assert!(!output.contains("minio-secret"), "{output}");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drive_token_is_required_on_demand() {
        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config");
        assert!(config.drive.require_access_token().is_err());
    }
}
