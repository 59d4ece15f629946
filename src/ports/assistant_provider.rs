//! Assistant provider port - interface for completion backends.
//!
//! Abstracts the service that turns a conversation history into an
//! assistant response, so the send/regenerate flows stay decoupled from any
//! concrete API. Backend failures surface to the store as a failed message,
//! never as a panic or a crashed task.

use async_trait::async_trait;
use thiserror::Error;

/// Role of a chat turn as seen by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single provider-agnostic chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Request for an assistant completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Conversation history, oldest first, ending with the latest user turn.
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Adds a turn to the history.
    pub fn with_message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
        self
    }
}

/// Response from the assistant backend.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Errors reported by assistant providers.
#[derive(Debug, Clone, Error)]
pub enum AssistantError {
    /// Provider rejected the request due to rate limiting.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is temporarily unavailable.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Network-level failure reaching the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with something we could not use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Port for assistant completion backends.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Generates a completion for the given conversation history.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AssistantError>;
}
