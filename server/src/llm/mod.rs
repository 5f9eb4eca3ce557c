//! LLM adapter behind the AgriBot chat widget.
//!
//! DESIGN
//! ======
//! The chat route depends on the [`ChatModel`] trait, not on Gemini directly.
//! History is normalised here before any provider sees it: the widget sends
//! the message being asked as the last history entry, and the conversation
//! must open with a user turn.

pub mod gemini;

use serde::{Deserialize, Serialize};

/// Persona given to the model on every request.
pub const SYSTEM_INSTRUCTION: &str = "You are AgriBot, an expert agricultural assistant. \n\
Your goal is to help farmers and gardening enthusiasts with advice on produce, fertilizers, pesticides, farming equipment (specifically John Deere and similar brands), and general crop care.\n\
Keep your responses helpful, concise, and encouraging. \n\
If asked about something unrelated to agriculture, politely steer the conversation back to farming topics.\n\
Use formatting like bullet points for lists of recommendations.";

/// Reply text when the failure carries no message of its own.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to my knowledge base right now. Please try again later.";

// =============================================================================
// TYPES
// =============================================================================

/// Author of a chat turn, spelled the way the widget and Gemini spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Bot,
}

/// One widget chat message. Extra widget fields (`id`, `timestamp`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Sender,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    /// No `GEMINI_API_KEY` is configured.
    #[error("Error: API Key is missing. Please check your configuration.")]
    MissingApiKey,

    /// The request body could not be read.
    #[error("{0}")]
    BadRequest(String),

    /// The HTTP request to the provider failed.
    #[error("{0}")]
    Request(String),

    /// The provider returned a non-success HTTP status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The provider response body could not be deserialized.
    #[error("{0}")]
    Parse(String),

    /// The provider answered without any text.
    #[error("empty response from model")]
    EmptyReply,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A chat-capable model.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Model name used for logging.
    fn model(&self) -> &str;

    /// Answer `message` given the prior conversation.
    async fn reply(&self, system: &str, history: &[ChatTurn], message: &str) -> Result<String, ChatbotError>;
}

/// Drop the trailing entry (the message being asked) and any bot turns
/// before the first user turn.
pub(crate) fn prepare_history(history: &[ChatTurn]) -> Vec<ChatTurn> {
    let Some((_, earlier)) = history.split_last() else {
        return Vec::new();
    };
    earlier
        .iter()
        .skip_while(|turn| turn.role == Sender::Bot)
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
