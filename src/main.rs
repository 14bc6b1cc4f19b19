use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medilink::api::{self, ApiContext};
use medilink::config;
use medilink::identity::DirectoryGateway;
use medilink::store::JsonFileStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = config::data_dir();
    let store = JsonFileStore::open(&data_dir)?;
    tracing::info!(dir = %data_dir.display(), "record store opened");

    let directory_file = config::directory_file();
    let identity = DirectoryGateway::load(&directory_file)?;
    tracing::info!(file = %directory_file.display(), "identity directory loaded");

    let ctx = ApiContext::new(Arc::new(store), Arc::new(identity));
    let mut server = api::start_server(ctx, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();

    Ok(())
}
