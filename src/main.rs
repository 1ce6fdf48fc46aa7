use sea_orm::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront::api::create_api_router;
use storefront::config::Config;
use storefront::entities::{primary_setup, setup_schema};
use storefront::storage::DiskStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    setup_schema(&db).await?;
    primary_setup(&db, &config.seed_password).await?;

    let storage = DiskStore::open(&config.upload_dir).await?;
    let listener = tokio::net::TcpListener::bind(config.bind_address.as_str()).await?;
    info!(address = %listener.local_addr()?, "Running");

    let app = create_api_router(Arc::new(db), Arc::new(storage), Arc::new(config));
    axum::serve(listener, app).await?;

    Ok(())
}
