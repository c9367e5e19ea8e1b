use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use manga_uploader::config::AppConfig;
use manga_uploader::infrastructure::storage;
use manga_uploader::{AppState, create_app};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the API server (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manga_uploader=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Manga Uploader...");

    // 2. Configuration must be complete before anything binds
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(
        "🛡️  Config: Repository={}, Staging={}, Max Size={}MB",
        config.repository(),
        config.staging_dir.display(),
        config.max_file_size / 1024 / 1024
    );

    // 3. Infrastructure
    let store = storage::setup_storage(&config);
    let staging = storage::setup_staging(&config)
        .await
        .with_context(|| format!("cannot create {}", config.staging_dir.display()))?;

    let state = AppState::new(config.clone(), store, staging);

    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Listening on port {}...", config.port);
    info!("📖 Swagger UI: http://localhost:{}/swagger-ui", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
