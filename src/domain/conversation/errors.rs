//! Store-specific error types.

use thiserror::Error;

use crate::domain::foundation::{ConversationId, ErrorCode, MessageId};

/// Errors produced by conversation store operations.
///
/// None of these are fatal: every operation either completes atomically or
/// leaves the store untouched, and every failure is reportable to the UI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Operation referenced a conversation absent from the repository.
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// Operation referenced a message absent from its conversation.
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// Input failed validation (empty or oversized content).
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Operation conflicts with the conversation's current state, e.g. a
    /// second placeholder while one response is still in flight.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// The assistant backend failed to produce a completion.
    #[error("Assistant backend error: {0}")]
    Backend(String),

    /// The persistence adapter failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn conversation_not_found(id: ConversationId) -> Self {
        StoreError::ConversationNotFound(id)
    }

    pub fn message_not_found(id: MessageId) -> Self {
        StoreError::MessageNotFound(id)
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        StoreError::StateConflict(message.into())
    }

    /// Maps the error to its wire-level code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            StoreError::MessageNotFound(_) => ErrorCode::MessageNotFound,
            StoreError::Validation { .. } => ErrorCode::ValidationFailed,
            StoreError::StateConflict(_) => ErrorCode::StateConflict,
            StoreError::Backend(_) => ErrorCode::BackendError,
            StoreError::Storage(_) => ErrorCode::StorageError,
        }
    }
}
