//! The `TextModel` trait -- the adapter interface for text-generation
//! backends.
//!
//! The plan generator only needs one thing from a backend: given an ordered
//! conversation of role-tagged messages and a temperature, return one
//! textual completion. The trait is intentionally object-safe so callers
//! can hold `&dyn TextModel` and tests can substitute canned responses.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role tag for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in the conversation sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Build a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single completion request: ordered messages plus sampling temperature.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Adapter interface for text-generation backends.
///
/// Implementors wrap a specific provider and return one completion per
/// request. The engine treats the response purely as text; decoding and
/// validation happen on the caller's side.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Identifier of the underlying model (e.g. "openai/gpt-4o-mini").
    fn name(&self) -> &str;

    /// Request one textual completion for the given conversation.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

// Compile-time assertion: TextModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn TextModel) {}
};
