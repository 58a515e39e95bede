use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use fitzone_backend::api::{self, AppState};
use fitzone_backend::config::Config;
use fitzone_backend::llm::{ChatModel, GeminiClient};
use fitzone_backend::metrics;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fitzone_backend=info,tower_http=info")),
        )
        .init();

    let config = Config::load();
    metrics::register_metrics();

    let model: Option<Arc<dyn ChatModel>> = match GeminiClient::from_config(&config.gemini) {
        Ok(Some(client)) => {
            tracing::info!(model = %config.gemini.model, "Gemini client ready");
            Some(Arc::new(client))
        }
        Ok(None) => {
            tracing::warn!("GEMINI_API_KEY is not set; /ai-coach will return 500");
            None
        }
        Err(e) => {
            tracing::error!("Failed to build Gemini client: {e}");
            None
        }
    };

    let state = AppState::new(model, config.zone_reasoning);
    let app = api::app(state, config.cors_origins.as_deref());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(
        reasoning = config.zone_reasoning.as_str(),
        "FitZone backend listening on {addr}"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
    tracing::info!("FitZone backend stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
