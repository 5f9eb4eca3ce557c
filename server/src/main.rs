mod config;
mod llm;
mod routes;
mod state;
mod weather;

use std::sync::Arc;

use llm::ChatModel;

#[tokio::main]
async fn main() {
    // A missing .env is normal in deployed environments.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ProxyConfig::from_env().expect("invalid proxy configuration");

    let weather = weather::OpenWeatherClient::new(&config.weather, config.timeouts).expect("weather client init failed");
    if config.weather.api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set; weather lookups will be rejected upstream");
    }

    // Initialize chatbot (non-fatal: chat answers with a config error if missing).
    let chatbot: Option<Arc<dyn ChatModel>> = match llm::gemini::GeminiClient::new(&config.gemini, config.timeouts) {
        Ok(client) => {
            tracing::info!(model = client.model(), "chatbot initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "chatbot not configured; chat disabled");
            None
        }
    };

    let state = state::AppState::new(Arc::new(weather), chatbot);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "widget proxy listening");
    axum::serve(listener, app).await.expect("server failed");
}
