mod application;
mod domain;
mod infrastructure;
mod presentation;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::{AppConfig, AppContainer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(
        port = config.server.port,
        index = %config.pinecone.index_name,
        direct_db = config.database.connection_string.is_some()
            && !config.database.disable_direct_connection,
        hosted_db = config.database.hosted_url.is_some(),
        "Configuration loaded"
    );

    let container = AppContainer::new(&config)?;

    if let Err(e) = container.http_server().run().await {
        error!(error = %e, "HTTP server stopped");
        return Err(e);
    }

    Ok(())
}
