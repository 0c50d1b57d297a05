//! Excaliframe web server
//!
//! Serves the wiki app descriptor, its lifecycle callbacks, the editor and
//! renderer pages and the built front-end assets.

mod config;
mod routes;

use config::ServerConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "excaliframe_server=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let addr = config.addr();

    info!("Excaliframe server starting on http://{}", addr);
    info!("Dist directory: {}", config.dist_dir.display());
    info!("Descriptor: http://{}/confluence/{}", addr, routes::DESCRIPTOR_FILE);
    if let Some(host) = &config.canonical_host {
        info!("Canonical host: {}", host);
    }

    let app = routes::router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
