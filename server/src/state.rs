//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! upstream clients sit behind trait objects so handlers can be exercised
//! with in-memory doubles.

use std::sync::Arc;

use crate::llm::ChatModel;
use crate::weather::WeatherApi;

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherApi>,
    /// `None` when no Gemini key is configured.
    pub chatbot: Option<Arc<dyn ChatModel>>,
}

impl AppState {
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherApi>, chatbot: Option<Arc<dyn ChatModel>>) -> Self {
        Self { weather, chatbot }
    }
}
