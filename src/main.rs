use std::sync::Arc;

use surveyscan::llm::{self, VisionChat};
use surveyscan::{config, routes, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = config::AppConfig::from_env()?;
    let port = config.port;

    // Vision model is optional: scan routes answer 503 without it.
    let vision: Option<Arc<dyn VisionChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "vision client initialized");
            Some(Arc::new(client) as Arc<dyn VisionChat>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "vision client not configured, scanning disabled");
            None
        }
    };

    let state = state::AppState::new(config, vision);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "surveyscan listening");
    axum::serve(listener, app).await?;
    Ok(())
}
