use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsletter_ai_backend::{
    config::Config,
    api::routes::create_router,
    llm::openai::OpenAiProvider,
    AppState,
};

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing OPENAI_API_KEY stops us here, before anything binds.
    let config = Config::load()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;
    let server_addr = config.server_addr;
    tracing::info!(?config, "Configuration loaded");

    let provider = Arc::new(OpenAiProvider::new(&config));
    let app_state = AppState::new(config, provider);

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!(%server_addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
