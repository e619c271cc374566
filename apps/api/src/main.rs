use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::analysis::AnalysisService;
use screener::config::Config;
use screener::db::create_pool;
use screener::log_store::{LogStore, MemoryLogStore, PgLogStore};
use screener::nlp_client::HttpNlpClient;
use screener::routes::build_router;
use screener::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener API v{}", env!("CARGO_PKG_VERSION"));

    let logs: Arc<dyn LogStore> = match &config.database_url {
        Some(url) => Arc::new(PgLogStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; analysis logs are kept in memory only");
            Arc::new(MemoryLogStore::new())
        }
    };

    let nlp = HttpNlpClient::new(config.nlp_base_url.clone(), config.nlp_timeout)?;
    info!(
        "NLP client initialized ({}, timeout {}s)",
        config.nlp_base_url,
        config.nlp_timeout.as_secs()
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Staging uploads in {}", config.upload_dir.display());

    let state = AppState {
        analysis: AnalysisService::new(Arc::new(nlp), logs, config.upload_dir.clone()),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
