use super::*;

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::llm::{ChatModel, Sender};
use crate::weather::{WeatherApi, WeatherError};

struct NoWeather;

#[async_trait::async_trait]
impl WeatherApi for NoWeather {
    async fn geocode(&self, _city: &str) -> Result<Value, WeatherError> {
        Err(WeatherError::Request("unused".into()))
    }

    async fn current(&self, _lat: &str, _lon: &str) -> Result<Value, WeatherError> {
        Err(WeatherError::Request("unused".into()))
    }

    async fn forecast(&self, _city: &str) -> Result<Value, WeatherError> {
        Err(WeatherError::Request("unused".into()))
    }
}

/// Records what it was asked and answers with a canned reply.
struct FakeModel {
    reply: Result<String, String>,
    seen: Mutex<Vec<(String, Vec<ChatTurn>, String)>>,
}

impl FakeModel {
    fn new(reply: Result<String, String>) -> Arc<Self> {
        Arc::new(Self { reply, seen: Mutex::new(Vec::new()) })
    }
}

#[async_trait::async_trait]
impl ChatModel for FakeModel {
    fn model(&self) -> &str {
        "fake"
    }

    async fn reply(&self, system: &str, history: &[ChatTurn], message: &str) -> Result<String, ChatbotError> {
        self.seen
            .lock()
            .unwrap()
            .push((system.to_string(), history.to_vec(), message.to_string()));
        self.reply
            .clone()
            .map_err(|message| ChatbotError::Api { status: 503, message })
    }
}

fn state_with(model: Option<Arc<FakeModel>>) -> AppState {
    AppState::new(Arc::new(NoWeather), model.map(|m| m as Arc<dyn ChatModel>))
}

fn turn(role: Sender, text: &str) -> ChatTurn {
    ChatTurn { role, text: text.into() }
}

fn request(message: &str, history: Vec<ChatTurn>) -> Result<Json<ChatbotRequest>, JsonRejection> {
    Ok(Json(ChatbotRequest { current_message: message.into(), history }))
}

async fn read(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn missing_key_reports_configuration_error() {
    let (status, body) = read(chatbot(State(state_with(None)), request("hi", vec![])).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error: API Key is missing. Please check your configuration." }));
}

#[tokio::test]
async fn reply_is_wrapped_in_response_field() {
    let model = FakeModel::new(Ok("Rotate your crops.".into()));
    let history = vec![
        turn(Sender::Bot, "Hi! I'm AgriBot."),
        turn(Sender::User, "hello"),
        turn(Sender::Bot, "How can I help?"),
        turn(Sender::User, "soil tips?"),
    ];
    let (status, body) = read(chatbot(State(state_with(Some(model.clone()))), request("soil tips?", history)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Rotate your crops." }));

    let seen = model.seen.lock().unwrap();
    let (system, history, message) = &seen[0];
    assert_eq!(system, SYSTEM_INSTRUCTION);
    assert_eq!(history, &vec![turn(Sender::User, "hello"), turn(Sender::Bot, "How can I help?")]);
    assert_eq!(message, "soil tips?");
}

#[tokio::test]
async fn model_failure_surfaces_its_message() {
    let model = FakeModel::new(Err("quota exceeded".into()));
    let (status, body) = read(chatbot(State(state_with(Some(model))), request("hi", vec![])).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "quota exceeded" }));
}

#[tokio::test]
async fn model_failure_without_message_uses_fallback() {
    let model = FakeModel::new(Err(String::new()));
    let (_, body) = read(chatbot(State(state_with(Some(model))), request("hi", vec![])).await).await;
    assert_eq!(body, json!({ "error": FALLBACK_REPLY }));
}

#[tokio::test]
async fn unreadable_body_is_internal_error_with_message() {
    use axum::extract::FromRequest;

    let model = FakeModel::new(Ok("unused".into()));
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/chatbot")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"history":[]}"#))
        .unwrap();
    let payload = Json::<ChatbotRequest>::from_request(req, &()).await;
    assert!(payload.is_err());

    let (status, body) = read(chatbot(State(state_with(Some(model.clone()))), payload).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("currentMessage")));
    assert!(model.seen.lock().unwrap().is_empty());
}

#[test]
fn chatbot_error_to_status_is_internal() {
    assert_eq!(chatbot_error_to_status(&ChatbotError::BadRequest("bad json".into())), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(chatbot_error_to_status(&ChatbotError::EmptyReply), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(chatbot_error_to_status(&ChatbotError::MissingApiKey), StatusCode::INTERNAL_SERVER_ERROR);
}
