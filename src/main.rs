//! Process entrypoint: loads `Config` from the environment, wires
//! `document-store` → `status-fabric` → `{alliance-client, keyed-cache,
//! sde-data}` → `ingest-core` → `ingest-api`, and either serves the HTTP
//! surface or runs a one-off admin subcommand.
//!
//! Env-var config loading, pool construction, and eviction-sweeper spawn
//! all happen here before the HTTP surface starts serving; this is the
//! workspace's only binary.

mod config;
mod logging;

use alliance_client::AllianceClient;
use clap::{Parser, Subcommand};
use config::Config;
use ingest_api::AppState;
use ingest_document_store::DocumentStore;
use keyed_cache::KeyedCache;
use sde_data::{DataDir, SdeUpdater, SdlCatalog};
use status_fabric::StatusFabric;

#[derive(Debug, Parser)]
#[command(name = "ingest-service", about = "Reference-Data Ingestion & Distribution Core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP surface and serve until shutdown.
    Serve,
    /// Run the SDE update-check protocol once and print the result.
    CheckSdeUpdate,
    /// Run the Bulk Alliance Importer once and print its stats.
    BulkImportAlliances,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Serve => serve(config).await,
        Command::CheckSdeUpdate => check_sde_update(config).await,
        Command::BulkImportAlliances => bulk_import_alliances(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = DocumentStore::open(&config.document_store_path).await?;
    let fabric = StatusFabric::new(store.clone());
    fabric.spawn_eviction_sweeper(config.eviction_sweep_interval);

    let client = AllianceClient::new(config.upstream_base_url.clone())?;
    let cache = KeyedCache::connect(&config.redis_url).await?;
    let data_dir = DataDir::new(config.sde_data_dir.clone(), config.sde_temp_dir.clone());
    let catalog = SdlCatalog::new(data_dir.clone());
    let updater = SdeUpdater::new(config.sde_manifest_url.clone(), config.sde_archive_url.clone())?;

    let state = AppState {
        store,
        fabric,
        client,
        cache,
        catalog,
        updater,
        data_dir,
    };

    let listener = tokio::net::TcpListener::bind(&config.http_bind).await?;
    tracing::info!(bind = %config.http_bind, "ingest-service listening");
    axum::serve(listener, ingest_api::app(state)).await?;
    Ok(())
}

async fn check_sde_update(config: Config) -> anyhow::Result<()> {
    let data_dir = DataDir::new(config.sde_data_dir.clone(), config.sde_temp_dir.clone());
    let updater = SdeUpdater::new(config.sde_manifest_url.clone(), config.sde_archive_url.clone())?;
    let check = updater.check_for_update(&data_dir).await?;
    println!("{}", serde_json::to_string_pretty(&check)?);
    Ok(())
}

async fn bulk_import_alliances(config: Config) -> anyhow::Result<()> {
    let store = DocumentStore::open(&config.document_store_path).await?;
    let client = AllianceClient::new(config.upstream_base_url.clone())?;
    let stats = ingest_core::run_bulk_import(&client, &store).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
