//! AgriBot chat route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use crate::llm::{ChatTurn, ChatbotError, FALLBACK_REPLY, SYSTEM_INSTRUCTION, prepare_history};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotRequest {
    pub current_message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// `POST /api/chatbot`: `{currentMessage, history}` → `{"response": text}`.
///
/// The key check runs before the body is inspected, so an unconfigured
/// proxy always reports the missing key.
pub async fn chatbot(State(state): State<AppState>, payload: Result<Json<ChatbotRequest>, JsonRejection>) -> Response {
    let Some(model) = state.chatbot.clone() else {
        return chatbot_error_response(&ChatbotError::MissingApiKey);
    };
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return chatbot_error_response(&ChatbotError::BadRequest(rejection.body_text())),
    };

    let history = prepare_history(&body.history);
    match model
        .reply(SYSTEM_INSTRUCTION, &history, &body.current_message)
        .await
    {
        Ok(text) => Json(json!({ "response": text })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, model = model.model(), "chatbot reply failed");
            chatbot_error_response(&e)
        }
    }
}

/// Every chatbot failure, including an unreadable body, is a 500 whose
/// `error` text the widget shows verbatim.
pub(crate) fn chatbot_error_to_status(err: &ChatbotError) -> StatusCode {
    match err {
        ChatbotError::MissingApiKey
        | ChatbotError::BadRequest(_)
        | ChatbotError::Request(_)
        | ChatbotError::Api { .. }
        | ChatbotError::Parse(_)
        | ChatbotError::EmptyReply
        | ChatbotError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error text shown in the widget: the error's own message, or the
/// fallback apology when it has none.
pub(crate) fn chatbot_error_text(err: &ChatbotError) -> String {
    let text = err.to_string();
    if text.trim().is_empty() { FALLBACK_REPLY.to_string() } else { text }
}

fn chatbot_error_response(err: &ChatbotError) -> Response {
    (chatbot_error_to_status(err), Json(json!({ "error": chatbot_error_text(err) }))).into_response()
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;
