use clap::Parser;
use feed_enricher::{Cli, Fetcher, GeminiClient, IngestionPipeline, PgArticleStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("Connecting to database: {}", cli.masked_database_url());
    let store = PgArticleStore::connect(&cli.database_url, cli.db_max_connections)
        .await
        .map_err(|e| {
            error!("Failed to connect to database {}: {}", cli.masked_database_url(), e);
            e
        })?;

    let fetcher = Fetcher::new(cli.fetch_config())?;
    let enricher = GeminiClient::new(cli.enrichment_config())?;

    let pipeline = IngestionPipeline::new(
        Arc::new(fetcher),
        Arc::new(enricher),
        Arc::new(store),
        cli.pipeline_config()?,
    );

    let stats = pipeline.run().await;
    println!("\n{}", stats);

    Ok(())
}
