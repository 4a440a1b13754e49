//! BrightPath API Server
//!
//! Main entry point for the BrightPath course platform backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brightpath_api::{AppState, create_router};
use brightpath_core::attachment::AttachmentStore;
use brightpath_core::storage::OpendalBackend;
use brightpath_db::connect;
use brightpath_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brightpath=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let backend = OpendalBackend::from_config(&config.storage)
        .context("failed to initialize storage backend")?;
    info!(provider = backend.provider_name(), "Storage backend ready");
    let attachments = AttachmentStore::from_config(Arc::new(backend), &config.storage)?;

    let state = AppState {
        db: Arc::new(db),
        attachments: Arc::new(attachments),
        signed_url_expiry_minutes: config.storage.signed_url_expiry_minutes,
    };

    let app = create_router(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
