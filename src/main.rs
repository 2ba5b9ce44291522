//! Olas Storefront - catalog service

use std::sync::Arc;
use anyhow::Result;
use olas_storefront::{
    api::{self, AppState},
    config::AppConfig,
    media::{CloudinaryUploader, MediaUploader, UnconfiguredUploader},
    store::{CatalogStore, MemoryCatalogStore, PgCatalogStore},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!(?config, "configuration loaded");

    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(config.db_max_connections).connect(url).await?;
            let store = PgCatalogStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
            Arc::new(MemoryCatalogStore::new())
        }
    };
    let media: Arc<dyn MediaUploader> = match config.cloudinary.clone() {
        Some(credentials) => Arc::new(CloudinaryUploader::new(credentials, config.media_folder.clone())),
        None => {
            tracing::warn!("Cloudinary credentials not set; image uploads are disabled");
            Arc::new(UnconfiguredUploader)
        }
    };

    let app = api::router(AppState { store, media });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("🚀 Olas Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => { signal.recv().await; }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
