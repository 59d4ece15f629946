//! Message types for conversations.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle state of a message.
///
/// User messages are `Complete` from the start. Assistant messages begin as
/// `Pending` placeholders while the response is in flight, then move to
/// `Complete` or `Failed`. A failed message keeps its slot in the thread so
/// the UI can offer a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Response in flight; content is empty until resolved.
    Pending,
    /// Final content available.
    Complete,
    /// The assistant backend failed; `reason` is display text for the UI.
    Failed { reason: String },
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    /// Whether regeneration is permitted. Only ever true for assistant
    /// messages that have finished (successfully or not).
    pub can_regenerate: bool,
    pub timestamp: Timestamp,
}

impl Message {
    /// Creates a completed user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            content: content.into(),
            status: MessageStatus::Complete,
            can_regenerate: false,
            timestamp: Timestamp::now(),
        }
    }

    /// Creates an assistant placeholder for an in-flight response.
    pub fn placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            content: String::new(),
            status: MessageStatus::Pending,
            can_regenerate: false,
            timestamp: Timestamp::now(),
        }
    }

    /// True while the assistant response is still in flight.
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    /// True if the backend failed to produce this message.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, MessageStatus::Failed { .. })
    }

    /// Fills in the final content for a resolved assistant response.
    pub(crate) fn resolve(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.status = MessageStatus::Complete;
        self.can_regenerate = self.role == Role::Assistant;
    }

    /// Marks the message as failed, keeping it regenerable for retry.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.content.clear();
        self.status = MessageStatus::Failed {
            reason: reason.into(),
        };
        self.can_regenerate = self.role == Role::Assistant;
    }

    /// Re-enters the pending state in place, for regeneration.
    pub(crate) fn reset_pending(&mut self) {
        self.content.clear();
        self.status = MessageStatus::Pending;
        self.can_regenerate = false;
    }
}
