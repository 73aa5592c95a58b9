use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use note2me::analysis::MockAnalyzer;
use note2me::api::guard;
use note2me::config::Config;
use note2me::AppState;

#[derive(Parser, Debug)]
#[command(name = "note2me")]
#[command(author, version, about = "A minimal journaling web app", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "note2me.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting note2me v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    note2me::utils::ensure_dir(&config.server.data_dir)?;

    // Initialize database
    let db = note2me::db::init(&config.server.data_dir).await?;

    // Create app state with the mock analysis engine
    let analyzer = Arc::new(MockAnalyzer::new(config.analysis.delay_ms));
    let state = Arc::new(AppState::new(config.clone(), db, analyzer));

    // Create API router
    let api_router = note2me::api::create_router(state.clone());

    // Serve the frontend with SPA fallback; the page guard decides
    // redirects before anything is served
    let static_dir = config.server.static_dir.clone();
    let index_file = static_dir.join("index.html");
    let serve_static = ServeDir::new(&static_dir).not_found_service(ServeFile::new(&index_file));

    let app = axum::Router::new()
        .merge(api_router)
        .fallback_service(serve_static)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            guard::page_guard,
        ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
