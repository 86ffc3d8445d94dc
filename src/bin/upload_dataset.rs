use anyhow::Context;
use clap::Parser;
use diet_etl::core::Storage;
use diet_etl::utils::{logger, validation::Validate};
use diet_etl::{AzureConfig, BlobStorage};

#[derive(Parser)]
#[command(name = "upload-dataset")]
#[command(about = "Upload the diet dataset CSV to Azure Blob Storage (Azurite in development)")]
struct Args {
    /// Local CSV file to upload
    #[arg(long, default_value = "data/All_Diets.csv")]
    file: String,

    /// Override the target container from the environment
    #[arg(long)]
    container: Option<String>,

    /// Blob name to upload as
    #[arg(long, default_value = "All_Diets.csv")]
    blob_name: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let mut config = AzureConfig::from_env()
        .context("Failed to load Azure storage settings from the environment")?;
    if let Some(container) = args.container {
        config.container = container;
    }
    config.validate()?;

    tracing::info!(
        "🚀 Uploading {} to container '{}' as blob '{}'",
        args.file,
        config.container,
        args.blob_name
    );

    let data = std::fs::read(&args.file)
        .with_context(|| format!("Missing dataset file: {}", args.file))?;

    let storage = BlobStorage::new(config.container_client(), config.prefix.clone());

    // 容器不存在時建立
    storage.ensure_container().await?;

    // 已存在的 blob 會被覆蓋
    storage.write_file(&args.blob_name, &data).await?;

    tracing::info!("✅ Upload complete ({} bytes)", data.len());
    println!(
        "✅ Uploaded {} to container '{}' as blob '{}'",
        args.file, config.container, args.blob_name
    );

    Ok(())
}
