use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tome::api::{create_router, AppState};
use tome::config::Config;
use tome::embeddings::EmbeddingProvider;
use tome::extraction::ExtractionProvider;
use tome::retrieval::{VectorSearchClient, VisionQueryClient};

#[derive(Parser)]
#[command(name = "tome")]
#[command(about = "Self-hostable document chat with retrieval-augmented answers")]
struct Args {
    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tome=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "TOME_API_KEYS is not set — document and chat endpoints are locked. Set TOME_API_KEYS to enable access."
        );
    }

    tracing::info!(
        "Initializing extraction provider: {} / {}...",
        config.extraction.ocr_model,
        config.extraction.crawl_model
    );
    let extraction = ExtractionProvider::new(&config.extraction)?;

    tracing::info!("Initializing embedding provider: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    tracing::info!("Initializing retrieval backends: {}...", config.retrieval.model);
    let vector = VectorSearchClient::new(&config.retrieval)?;
    let vision = VisionQueryClient::new(&config.retrieval)?;

    let cancel_token = CancellationToken::new();
    let state = AppState::new(
        config.clone(),
        extraction,
        embeddings,
        vector,
        vision,
        cancel_token.clone(),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Tome starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling in-flight requests...");
    cancel_token.cancel();
}
