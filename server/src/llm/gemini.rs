//! Gemini `generateContent` client.
//!
//! Each widget message is one stateless request: system instruction, the
//! prepared history, then the new user message.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::{ChatModel, ChatTurn, ChatbotError, Sender};
use crate::config::{GeminiConfig, HttpTimeouts};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`ChatbotError::MissingApiKey`] when no key is configured, or
    /// [`ChatbotError::HttpClientBuild`] if reqwest cannot build.
    pub fn new(config: &GeminiConfig, timeouts: HttpTimeouts) -> Result<Self, ChatbotError> {
        let api_key = config.api_key.clone().ok_or(ChatbotError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ChatbotError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, model: config.model.clone(), base_url: config.base_url.clone() })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn send_json(&self, body: &impl Serialize) -> Result<String, ChatbotError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ChatbotError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ChatbotError::Request(e.to_string()))?;
        if status != 200 {
            return Err(ChatbotError::Api { status, message: parse_error_message(&text) });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ChatModel for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn reply(&self, system: &str, history: &[ChatTurn], message: &str) -> Result<String, ChatbotError> {
        let body = build_request(system, history, message);
        let text = self.send_json(&body).await?;
        parse_generate_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

fn role_name(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Bot => "model",
    }
}

fn build_request<'a>(system: &'a str, history: &'a [ChatTurn], message: &'a str) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = history
        .iter()
        .map(|turn| Content { role: Some(role_name(turn.role)), parts: vec![Part { text: &turn.text }] })
        .collect();
    contents.push(Content { role: Some("user"), parts: vec![Part { text: message }] });
    GenerateRequest { system_instruction: Content { role: None, parts: vec![Part { text: system }] }, contents }
}

/// Concatenated text parts of the first candidate.
fn parse_generate_response(text: &str) -> Result<String, ChatbotError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ChatbotError::Parse(e.to_string()))?;
    let parts = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array);

    let reply: String = parts
        .into_iter()
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if reply.is_empty() {
        if let Some(reason) = value
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(Value::as_str)
        {
            tracing::warn!(%reason, "gemini blocked prompt");
        }
        return Err(ChatbotError::EmptyReply);
    }
    Ok(reply)
}

/// `error.message` from a Gemini error body, or the raw body.
fn parse_error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
