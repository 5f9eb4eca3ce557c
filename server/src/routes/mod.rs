//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The storefront calls these endpoints for its weather and chat widgets so
//! provider keys stay server-side. Everything else the storefront uses lives
//! on the marketplace backend, not here.

pub mod chatbot;
pub mod weather;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Widget proxy routes plus health check.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/weather/direct", get(weather::direct))
        .route("/api/weather/location", get(weather::location))
        .route("/api/weather/forecast", get(weather::forecast))
        .route("/api/chatbot", post(chatbot::chatbot))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
