use anyhow::{Context, Result, bail};
use clap::Parser;
use docsearch::{
    config, health::HealthChecker, logging, qdrant::QdrantService, storage::MinioClient,
};

#[derive(Parser)]
#[command(
    name = "docsearch-health",
    about = "Check that Qdrant, MinIO and the database are reachable"
)]
struct Cli {
    /// Print the report as JSON instead of one line per service.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing("docsearch-health");
    let config = config::init_config().context("Failed to load configuration")?;

    let qdrant = QdrantService::new(&config.qdrant).context("Failed to initialize Qdrant client")?;
    let store =
        MinioClient::new(&config.minio).context("Failed to initialize object store client")?;
    let report = HealthChecker::new(qdrant, store, config.database.clone())
        .check()
        .await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, status) in [
            ("qdrant", &report.qdrant),
            ("object store", &report.object_store),
            ("database", &report.database),
        ] {
            let state = if status.reachable { "reachable" } else { "unreachable" };
            match &status.detail {
                Some(detail) => println!("{name}: {state} ({detail})"),
                None => println!("{name}: {state}"),
            }
        }
    }

    if !report.all_reachable() {
        bail!("One or more services are unreachable");
    }
    Ok(())
}
