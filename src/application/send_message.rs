//! SendMessage command handler.
//!
//! Appends the user's message, reserves an assistant placeholder, asks the
//! backend for a completion, and resolves or fails the placeholder with the
//! outcome. Backend failures are recorded on the message itself, not
//! returned as `Err`, so the UI keeps a consistent thread to render.

use std::sync::Arc;

use crate::application::ConversationStore;
use crate::domain::conversation::{Conversation, Role, StoreError};
use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::{AssistantProvider, ChatRole, CompletionRequest};

/// Command to send a user message in a conversation.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub conversation_id: ConversationId,
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
        }
    }
}

/// Result of a completed send flow.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub user_message_id: MessageId,
    pub assistant_message_id: MessageId,
    /// Backend failure reason, if the assistant message ended up failed.
    pub backend_error: Option<String>,
}

/// Handler for the send-message flow.
pub struct SendMessageHandler {
    provider: Arc<dyn AssistantProvider>,
}

impl SendMessageHandler {
    pub fn new(provider: Arc<dyn AssistantProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        store: &mut ConversationStore,
        cmd: SendMessageCommand,
    ) -> Result<SendMessageResult, StoreError> {
        // 1. Append the user message (validates content and conversation)
        let user_message_id = store
            .append_user_message(cmd.conversation_id, &cmd.content)
            .await?;

        // 2. Reserve the in-flight placeholder (single-pending invariant)
        let assistant_message_id = store
            .append_assistant_placeholder(cmd.conversation_id)
            .await?;

        // 3. Build the request from completed history, placeholder excluded
        let request = match store.get(cmd.conversation_id) {
            Some(conversation) => build_request(conversation, assistant_message_id),
            None => return Err(StoreError::conversation_not_found(cmd.conversation_id)),
        };

        // 4. Ask the backend and apply the outcome
        let outcome = self.provider.complete(request).await;
        let backend_error = apply_outcome(
            store,
            cmd.conversation_id,
            assistant_message_id,
            outcome.map(|r| r.content),
        )
        .await?;

        Ok(SendMessageResult {
            user_message_id,
            assistant_message_id,
            backend_error,
        })
    }
}

/// Builds a provider request from the completed messages preceding `before`.
pub(crate) fn build_request(conversation: &Conversation, before: MessageId) -> CompletionRequest {
    conversation
        .completed_history(Some(before))
        .into_iter()
        .map(|m| {
            let role = match m.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            };
            (role, m.content.clone())
        })
        .fold(CompletionRequest::default(), |req, (role, content)| {
            req.with_message(role, content)
        })
}

/// Applies a completion outcome to the placeholder, tolerating mid-flight
/// deletion of the conversation or the message (the cancellation rule: a
/// superseded resolution must no-op, not throw).
///
/// Returns the backend failure reason when the message was marked failed.
pub(crate) async fn apply_outcome(
    store: &mut ConversationStore,
    conversation_id: ConversationId,
    message_id: MessageId,
    outcome: Result<String, impl std::fmt::Display>,
) -> Result<Option<String>, StoreError> {
    if store.get(conversation_id).is_none() {
        tracing::debug!(
            conversation_id = %conversation_id,
            "conversation deleted mid-flight, dropping assistant response"
        );
        return Ok(None);
    }

    let applied = match &outcome {
        Ok(content) => {
            store
                .resolve_assistant_message(conversation_id, message_id, content)
                .await
        }
        Err(reason) => {
            tracing::warn!(
                conversation_id = %conversation_id,
                error = %reason,
                "assistant backend failed, marking message as failed"
            );
            store
                .fail_assistant_message(conversation_id, message_id, &reason.to_string())
                .await
        }
    };

    match applied {
        Ok(()) => Ok(outcome.err().map(|e| e.to_string())),
        Err(StoreError::MessageNotFound(_)) => {
            tracing::debug!(
                conversation_id = %conversation_id,
                message_id = %message_id,
                "placeholder deleted mid-flight, dropping assistant response"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
