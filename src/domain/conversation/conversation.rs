//! Conversation entity - a titled, ordered thread of chat messages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, MessageStatus, StoreError};
use crate::domain::foundation::{ConversationId, MessageId, Timestamp};

/// Title given to conversations created without one.
pub const DEFAULT_TITLE: &str = "New chat";

/// Conversation entity - tracks messages and metadata for one chat thread.
///
/// Messages are kept in insertion (chronological) order and are exclusively
/// owned by the conversation. At most one message may be pending (an
/// in-flight assistant response) at any time; that invariant is what keeps
/// two concurrent sends from corrupting a single thread.
///
/// Every mutation bumps `updated_at`. All mutating operations validate
/// before touching state, so a failed call leaves the entity unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    title: String,
    pinned: bool,
    tags: BTreeSet<String>,
    messages: Vec<Message>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Creates a new empty conversation.
    ///
    /// A blank or missing title falls back to [`DEFAULT_TITLE`].
    pub fn new(title: Option<&str>) -> Self {
        let now = Timestamp::now();
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TITLE.to_string(),
        };
        Self {
            id: ConversationId::new(),
            title,
            pinned: false,
            tags: BTreeSet::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns the in-flight assistant placeholder, if any.
    pub fn pending_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_pending())
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    // === Metadata ===

    /// Renames the conversation.
    ///
    /// # Errors
    ///
    /// `Validation` if the new title is blank.
    pub fn rename(&mut self, title: &str) -> Result<(), StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title", "cannot be empty"));
        }
        self.title = title.to_string();
        self.touch();
        Ok(())
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
        self.touch();
    }

    pub fn set_tags(&mut self, tags: BTreeSet<String>) {
        self.tags = tags;
        self.touch();
    }

    // === Message Management ===

    /// Appends a user message.
    ///
    /// # Errors
    ///
    /// `Validation` if the content is blank after trimming or exceeds
    /// `max_chars`.
    pub fn append_user(&mut self, content: &str, max_chars: usize) -> Result<MessageId, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::validation("content", "cannot be empty"));
        }
        if content.chars().count() > max_chars {
            return Err(StoreError::validation(
                "content",
                format!("exceeds maximum length of {} characters", max_chars),
            ));
        }

        let message = Message::user(content);
        let id = message.id;
        self.messages.push(message);
        self.touch();
        Ok(id)
    }

    /// Appends an assistant placeholder for an in-flight response.
    ///
    /// # Errors
    ///
    /// `StateConflict` if a response is already pending in this conversation.
    pub fn append_placeholder(&mut self) -> Result<MessageId, StoreError> {
        if self.pending_message().is_some() {
            return Err(StoreError::state_conflict(
                "a response is already pending in this conversation",
            ));
        }

        let message = Message::placeholder();
        let id = message.id;
        self.messages.push(message);
        self.touch();
        Ok(id)
    }

    /// Resolves a pending assistant message with its final content.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message is absent
    /// - `StateConflict` if the message is not pending
    pub fn resolve(&mut self, message_id: MessageId, content: &str) -> Result<(), StoreError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(StoreError::message_not_found(message_id))?;
        if !message.is_pending() {
            return Err(StoreError::state_conflict(
                "only a pending message can be resolved",
            ));
        }
        message.resolve(content);
        self.touch();
        Ok(())
    }

    /// Marks a pending assistant message as failed.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message is absent
    /// - `StateConflict` if the message is not pending
    pub fn fail(&mut self, message_id: MessageId, reason: &str) -> Result<(), StoreError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(StoreError::message_not_found(message_id))?;
        if !message.is_pending() {
            return Err(StoreError::state_conflict(
                "only a pending message can be marked failed",
            ));
        }
        message.fail(reason);
        self.touch();
        Ok(())
    }

    /// Re-enters the pending state for a finished assistant message, in
    /// place, without creating a new placeholder.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message is absent
    /// - `StateConflict` if the message is not regenerable, or another
    ///   response is already pending
    pub fn regenerate(&mut self, message_id: MessageId) -> Result<(), StoreError> {
        if self.pending_message().is_some() {
            return Err(StoreError::state_conflict(
                "a response is already pending in this conversation",
            ));
        }
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(StoreError::message_not_found(message_id))?;
        if !message.can_regenerate {
            return Err(StoreError::state_conflict(
                "message does not permit regeneration",
            ));
        }
        message.reset_pending();
        self.touch();
        Ok(())
    }

    /// Removes a message. Idempotent: removing an absent id is a no-op.
    pub fn delete_message(&mut self, message_id: MessageId) {
        if let Some(pos) = self.messages.iter().position(|m| m.id == message_id) {
            self.messages.remove(pos);
            self.touch();
        }
    }

    // === Search ===

    /// Case-insensitive substring match over title and message content.
    ///
    /// `needle` must already be lowercased by the caller.
    pub fn matches(&self, needle: &str) -> bool {
        if self.title.to_lowercase().contains(needle) {
            return true;
        }
        self.messages
            .iter()
            .any(|m| m.content.to_lowercase().contains(needle))
    }

    /// Returns the completed messages preceding `before`, or all completed
    /// messages when `before` is `None`. This is the history handed to the
    /// assistant backend; pending and failed messages never appear in it.
    pub fn completed_history(&self, before: Option<MessageId>) -> Vec<&Message> {
        let end = before
            .and_then(|id| self.messages.iter().position(|m| m.id == id))
            .unwrap_or(self.messages.len());
        self.messages[..end]
            .iter()
            .filter(|m| m.status == MessageStatus::Complete)
            .collect()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 4096;

    fn conversation_with_resolved_reply() -> (Conversation, MessageId) {
        let mut conv = Conversation::new(Some("Test"));
        conv.append_user("Hello", MAX).unwrap();
        let id = conv.append_placeholder().unwrap();
        conv.resolve(id, "Hi there!").unwrap();
        (conv, id)
    }

    #[test]
    fn new_conversation_is_empty() {
        let conv = Conversation::new(Some("My Chat"));
        assert_eq!(conv.title(), "My Chat");
        assert_eq!(conv.message_count(), 0);
        assert_eq!(conv.created_at(), conv.updated_at());
    }

    #[test]
    fn missing_or_blank_title_falls_back_to_default() {
        assert_eq!(Conversation::new(None).title(), DEFAULT_TITLE);
        assert_eq!(Conversation::new(Some("   ")).title(), DEFAULT_TITLE);
    }

    #[test]
    fn append_user_rejects_whitespace_only_content() {
        let mut conv = Conversation::new(None);
        let result = conv.append_user("   ", MAX);
        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn append_user_rejects_oversized_content() {
        let mut conv = Conversation::new(None);
        let result = conv.append_user(&"x".repeat(MAX + 1), MAX);
        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn append_user_trims_content() {
        let mut conv = Conversation::new(None);
        let id = conv.append_user("  Hello  ", MAX).unwrap();
        assert_eq!(conv.message(id).unwrap().content, "Hello");
    }

    #[test]
    fn second_placeholder_without_resolve_is_a_state_conflict() {
        let mut conv = Conversation::new(None);
        conv.append_user("Hello", MAX).unwrap();
        conv.append_placeholder().unwrap();

        let result = conv.append_placeholder();
        assert!(matches!(result, Err(StoreError::StateConflict(_))));
        assert_eq!(conv.message_count(), 2);
    }

    #[test]
    fn resolve_fills_content_and_enables_regeneration() {
        let (conv, id) = conversation_with_resolved_reply();
        let msg = conv.message(id).unwrap();
        assert_eq!(msg.content, "Hi there!");
        assert!(msg.can_regenerate);
        assert!(conv.pending_message().is_none());
    }

    #[test]
    fn resolve_unknown_message_reports_not_found() {
        let mut conv = Conversation::new(None);
        let result = conv.resolve(MessageId::new(), "content");
        assert!(matches!(result, Err(StoreError::MessageNotFound(_))));
    }

    #[test]
    fn resolve_twice_is_a_state_conflict() {
        let (mut conv, id) = conversation_with_resolved_reply();
        let result = conv.resolve(id, "again");
        assert!(matches!(result, Err(StoreError::StateConflict(_))));
    }

    #[test]
    fn fail_marks_message_failed_and_regenerable() {
        let mut conv = Conversation::new(None);
        conv.append_user("Hello", MAX).unwrap();
        let id = conv.append_placeholder().unwrap();
        conv.fail(id, "backend unavailable").unwrap();

        let msg = conv.message(id).unwrap();
        assert!(msg.is_failed());
        assert!(msg.can_regenerate);
    }

    #[test]
    fn regenerate_re_enters_pending_in_place() {
        let (mut conv, id) = conversation_with_resolved_reply();
        let count_before = conv.message_count();

        conv.regenerate(id).unwrap();

        assert_eq!(conv.message_count(), count_before);
        let msg = conv.message(id).unwrap();
        assert!(msg.is_pending());
        assert!(msg.content.is_empty());
    }

    #[test]
    fn regenerate_rejects_user_messages() {
        let mut conv = Conversation::new(None);
        let id = conv.append_user("Hello", MAX).unwrap();
        let result = conv.regenerate(id);
        assert!(matches!(result, Err(StoreError::StateConflict(_))));
    }

    #[test]
    fn regenerate_rejects_while_another_response_is_pending() {
        let (mut conv, resolved) = conversation_with_resolved_reply();
        conv.append_user("More", MAX).unwrap();
        conv.append_placeholder().unwrap();

        let result = conv.regenerate(resolved);
        assert!(matches!(result, Err(StoreError::StateConflict(_))));
    }

    #[test]
    fn delete_message_is_idempotent() {
        let mut conv = Conversation::new(None);
        let id = conv.append_user("Hello", MAX).unwrap();

        conv.delete_message(id);
        assert_eq!(conv.message_count(), 0);

        // Second delete is a no-op.
        conv.delete_message(id);
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn matches_searches_title_and_content() {
        let (conv, _) = conversation_with_resolved_reply();
        assert!(conv.matches("test"));
        assert!(conv.matches("hi there"));
        assert!(!conv.matches("unrelated"));
    }

    #[test]
    fn completed_history_excludes_pending_and_failed() {
        let mut conv = Conversation::new(None);
        conv.append_user("First", MAX).unwrap();
        let failed = conv.append_placeholder().unwrap();
        conv.fail(failed, "oops").unwrap();
        conv.append_user("Second", MAX).unwrap();
        conv.append_placeholder().unwrap();

        let history = conv.completed_history(None);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["First", "Second"]);
    }

    #[test]
    fn completed_history_stops_before_the_given_message() {
        let (mut conv, resolved) = conversation_with_resolved_reply();
        conv.append_user("Follow-up", MAX).unwrap();

        let history = conv.completed_history(Some(resolved));
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hello"]);
    }

    #[test]
    fn rename_rejects_blank_titles() {
        let mut conv = Conversation::new(Some("Before"));
        assert!(conv.rename("  ").is_err());
        assert_eq!(conv.title(), "Before");

        conv.rename("After").unwrap();
        assert_eq!(conv.title(), "After");
    }

    #[test]
    fn conversation_roundtrips_through_json() {
        let (conv, _) = conversation_with_resolved_reply();
        let json = serde_json::to_string(&conv).unwrap();
        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(conv, back);
    }
}
