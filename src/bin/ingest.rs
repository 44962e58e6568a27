use anyhow::{Context, Result, bail};
use clap::Parser;
use docsearch::{
    config, drive::DriveClient, ingest::FailurePolicy, ingest::IngestionWalker, logging,
    storage::MinioClient,
};

#[derive(Parser)]
#[command(
    name = "docsearch-ingest",
    about = "Copy scoped Google Drive folders into the document bucket"
)]
struct Cli {
    /// Drive folder whose subfolders are candidates for ingestion.
    #[arg(long, env = "FOLDER_DRIVE_ID")]
    folder_id: Option<String>,
    /// Top-level folder name to ingest; repeat for several. Defaults to `INGEST_SCOPES`.
    #[arg(long = "scope")]
    scopes: Vec<String>,
    /// Destination bucket, overriding `MINIO_BUCKET`.
    #[arg(long)]
    bucket: Option<String>,
    /// Stop at the first failing folder or file.
    #[arg(long)]
    abort_on_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing("docsearch-ingest");
    let config = config::init_config().context("Failed to load configuration")?;

    let folder_id = cli
        .folder_id
        .or_else(|| config.drive.root_folder_id.clone())
        .context("No root folder given; pass --folder-id or set FOLDER_DRIVE_ID")?;
    let scopes = if cli.scopes.is_empty() {
        config.drive.scopes.clone()
    } else {
        cli.scopes
    };
    if scopes.is_empty() {
        bail!("No scopes given; pass --scope or set INGEST_SCOPES");
    }

    let token = config.drive.require_access_token()?;
    let drive = DriveClient::new(&config.drive.api_url, token)
        .context("Failed to initialize Drive client")?;
    let mut store =
        MinioClient::new(&config.minio).context("Failed to initialize object store client")?;
    if let Some(bucket) = cli.bucket {
        store = store.with_bucket(bucket);
    }
    let policy = if cli.abort_on_error {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Continue
    };

    tracing::info!(folder_id = %folder_id, scopes = ?scopes, ?policy, "Starting ingestion");
    let report = IngestionWalker::new(drive, store)
        .run(&folder_id, &scopes, policy)
        .await
        .context("Ingestion failed")?;

    println!(
        "Uploaded {} document(s), {} failure(s)",
        report.uploaded.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {}: {}", failure.path, failure.error);
    }

    if !report.is_clean() {
        bail!("{} item(s) failed to ingest", report.failures.len());
    }
    Ok(())
}
