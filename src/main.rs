use anyhow::Result;
use pixora_backend::config::config_loader;
use pixora_backend::infrastructure::axum_http::http_serve;
use pixora_backend::infrastructure::document_store::DocumentStore;
use pixora_backend::observability;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability()?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let document_store = DocumentStore::new();
    info!("Document store has been initialized");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(document_store)).await?;

    Ok(())
}
