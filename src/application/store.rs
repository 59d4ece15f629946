//! ConversationStore - repository and selection for chat conversations.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::domain::conversation::{Conversation, StoreError};
use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::ConversationStorage;

/// Partial update applied to a conversation's metadata.
///
/// Absent fields are left untouched; `updated_at` is bumped regardless.
#[derive(Debug, Clone, Default)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub pinned: Option<bool>,
    pub tags: Option<BTreeSet<String>>,
}

/// In-memory registry of chat conversations with deterministic selection.
///
/// The store owns the ordered conversation collection and the notion of the
/// "currently open" conversation. All operations run to completion before
/// the next one starts (the store is `&mut`-serialized), so each mutation is
/// atomic: it either applies fully or leaves the store untouched.
///
/// # Ordering
///
/// New conversations are inserted at the head (most-recent-first).
/// [`ConversationStore::list`] returns pinned conversations first, then the
/// rest, each group in insertion order. Selection recomputation after a
/// deletion follows this same ordering.
///
/// # Selection
///
/// Creating a conversation auto-selects it when
/// `config.auto_select_created` is set (the default). Deleting the selected
/// conversation moves the selection to the first conversation of `list()`
/// order, or clears it when the store is empty; the selection never dangles.
///
/// # Persistence
///
/// Every mutating operation saves the full collection through the storage
/// port. A failed save is logged at `warn` and does not roll back the
/// in-memory mutation; durability is best-effort.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current: Option<ConversationId>,
    storage: Arc<dyn ConversationStorage>,
    config: StoreConfig,
}

impl ConversationStore {
    /// Opens the store, loading any persisted conversations.
    ///
    /// Selection initializes to the first conversation in `list()` order,
    /// or none when the snapshot is empty.
    ///
    /// # Errors
    ///
    /// `Storage` if the snapshot exists but cannot be loaded.
    pub async fn open(
        storage: Arc<dyn ConversationStorage>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        let conversations = storage
            .load()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        tracing::debug!(count = conversations.len(), "conversation store opened");

        let mut store = Self {
            conversations,
            current: None,
            storage,
            config,
        };
        store.current = store.first_listed();
        Ok(store)
    }

    // === Repository ===

    /// Creates a new empty conversation and returns its id.
    ///
    /// The fresh id is allocated before insertion, so no two conversations
    /// ever share an id, even transiently. The new conversation is inserted
    /// at the head and, by default, becomes the active one. Titles longer
    /// than the configured maximum are truncated.
    pub async fn create(&mut self, title: Option<&str>) -> ConversationId {
        let truncated = title.map(|t| {
            t.chars()
                .take(self.config.max_title_chars)
                .collect::<String>()
        });
        let conversation = Conversation::new(truncated.as_deref());
        let id = conversation.id();
        self.conversations.insert(0, conversation);
        if self.config.auto_select_created {
            self.current = Some(id);
        }
        self.persist().await;
        id
    }

    /// Looks up a conversation by id.
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    /// Merges a partial update into a conversation's metadata.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the id is absent
    /// - `Validation` if the new title is blank or too long
    pub async fn update(
        &mut self,
        id: ConversationId,
        update: ConversationUpdate,
    ) -> Result<(), StoreError> {
        if let Some(title) = &update.title {
            if title.trim().chars().count() > self.config.max_title_chars {
                return Err(StoreError::validation(
                    "title",
                    format!(
                        "exceeds maximum length of {} characters",
                        self.config.max_title_chars
                    ),
                ));
            }
        }

        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(StoreError::conversation_not_found(id))?;

        if let Some(title) = &update.title {
            conversation.rename(title)?;
        }
        if let Some(pinned) = update.pinned {
            conversation.set_pinned(pinned);
        }
        if let Some(tags) = update.tags.clone() {
            conversation.set_tags(tags);
        }
        // An empty update still counts as a touch.
        if update.title.is_none() && update.pinned.is_none() && update.tags.is_none() {
            conversation.touch();
        }

        self.persist().await;
        Ok(())
    }

    /// Deletes a conversation and everything it owns.
    ///
    /// Idempotent: deleting an absent id is a no-op. Deleting the selected
    /// conversation recomputes the selection.
    pub async fn delete(&mut self, id: ConversationId) {
        let Some(pos) = self.conversations.iter().position(|c| c.id() == id) else {
            return;
        };
        self.conversations.remove(pos);
        if self.current == Some(id) {
            self.current = self.first_listed();
        }
        self.persist().await;
    }

    /// Returns all conversations: pinned first, then the rest, each group
    /// in insertion (most-recent-first) order.
    pub fn list(&self) -> Vec<&Conversation> {
        let pinned = self.conversations.iter().filter(|c| c.is_pinned());
        let unpinned = self.conversations.iter().filter(|c| !c.is_pinned());
        pinned.chain(unpinned).collect()
    }

    /// Case-insensitive substring search over titles and message content.
    ///
    /// A blank query returns [`ConversationStore::list`] unchanged.
    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list();
        }
        self.list()
            .into_iter()
            .filter(|c| c.matches(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    // === Selection ===

    /// Makes a conversation the active one.
    ///
    /// # Errors
    ///
    /// `ConversationNotFound` if the id is absent; the selection must always
    /// reference a real conversation or none.
    pub fn select(&mut self, id: ConversationId) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::conversation_not_found(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Returns the active conversation id, if any.
    pub fn current(&self) -> Option<ConversationId> {
        self.current
    }

    /// Returns the active conversation, if any.
    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current.and_then(|id| self.get(id))
    }

    // === Messages ===

    /// Appends a user message to a conversation.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation is absent
    /// - `Validation` if the content is blank or oversized
    pub async fn append_user_message(
        &mut self,
        id: ConversationId,
        content: &str,
    ) -> Result<MessageId, StoreError> {
        let max_chars = self.config.max_message_chars;
        let message_id = self.conversation_mut(id)?.append_user(content, max_chars)?;
        self.persist().await;
        Ok(message_id)
    }

    /// Appends an assistant placeholder for an in-flight response.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation is absent
    /// - `StateConflict` if a response is already pending
    pub async fn append_assistant_placeholder(
        &mut self,
        id: ConversationId,
    ) -> Result<MessageId, StoreError> {
        let message_id = self.conversation_mut(id)?.append_placeholder()?;
        self.persist().await;
        Ok(message_id)
    }

    /// Resolves a pending assistant message with its final content.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` / `MessageNotFound` if either id is absent
    /// - `StateConflict` if the message is not pending
    pub async fn resolve_assistant_message(
        &mut self,
        id: ConversationId,
        message_id: MessageId,
        content: &str,
    ) -> Result<(), StoreError> {
        self.conversation_mut(id)?.resolve(message_id, content)?;
        self.persist().await;
        Ok(())
    }

    /// Marks a pending assistant message as failed, keeping it in the
    /// thread as a retryable error marker.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` / `MessageNotFound` if either id is absent
    /// - `StateConflict` if the message is not pending
    pub async fn fail_assistant_message(
        &mut self,
        id: ConversationId,
        message_id: MessageId,
        reason: &str,
    ) -> Result<(), StoreError> {
        self.conversation_mut(id)?.fail(message_id, reason)?;
        self.persist().await;
        Ok(())
    }

    /// Re-enters the pending state for a finished assistant message.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` / `MessageNotFound` if either id is absent
    /// - `StateConflict` if the message is not regenerable or another
    ///   response is pending
    pub async fn regenerate_message(
        &mut self,
        id: ConversationId,
        message_id: MessageId,
    ) -> Result<(), StoreError> {
        self.conversation_mut(id)?.regenerate(message_id)?;
        self.persist().await;
        Ok(())
    }

    /// Removes a message from a conversation.
    ///
    /// Idempotent at both levels: an absent conversation or message is a
    /// no-op, since the UI may double-fire deletions.
    pub async fn delete_message(&mut self, id: ConversationId, message_id: MessageId) {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id() == id) else {
            return;
        };
        let before = conversation.message_count();
        conversation.delete_message(message_id);
        if conversation.message_count() != before {
            self.persist().await;
        }
    }

    // === Internals ===

    fn conversation_mut(&mut self, id: ConversationId) -> Result<&mut Conversation, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(StoreError::conversation_not_found(id))
    }

    fn first_listed(&self) -> Option<ConversationId> {
        self.list().first().map(|c| c.id())
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.save(&self.conversations).await {
            tracing::warn!(error = %e, "failed to persist conversations, keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryStorage;

    async fn empty_store() -> ConversationStore {
        ConversationStore::open(Arc::new(InMemoryStorage::new()), StoreConfig::default())
            .await
            .unwrap()
    }

    /// Storage whose saves always fail; loads start empty.
    struct BrokenStorage;

    #[async_trait::async_trait]
    impl crate::ports::ConversationStorage for BrokenStorage {
        async fn load(&self) -> Result<Vec<Conversation>, crate::ports::StorageError> {
            Ok(Vec::new())
        }

        async fn save(
            &self,
            _conversations: &[Conversation],
        ) -> Result<(), crate::ports::StorageError> {
            Err(crate::ports::StorageError::Io("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_save_keeps_in_memory_state() {
        let mut store = ConversationStore::open(Arc::new(BrokenStorage), StoreConfig::default())
            .await
            .unwrap();

        // Every mutation triggers a save; none of the failures surface.
        let id = store.create(Some("Ephemeral")).await;
        store.append_user_message(id, "Hello").await.unwrap();

        assert_eq!(store.current(), Some(id));
        assert_eq!(store.get(id).unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn create_then_get_returns_empty_conversation() {
        let mut store = empty_store().await;
        let id = store.create(Some("My Chat")).await;

        let conv = store.get(id).unwrap();
        assert_eq!(conv.title(), "My Chat");
        assert_eq!(conv.message_count(), 0);
    }

    #[tokio::test]
    async fn create_inserts_at_head_and_auto_selects() {
        let mut store = empty_store().await;
        let first = store.create(Some("First")).await;
        let second = store.create(Some("Second")).await;

        let ids: Vec<ConversationId> = store.list().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(store.current(), Some(second));
    }

    #[tokio::test]
    async fn create_without_auto_select_keeps_selection() {
        let config = StoreConfig {
            auto_select_created: false,
            ..StoreConfig::default()
        };
        let mut store = ConversationStore::open(Arc::new(InMemoryStorage::new()), config)
            .await
            .unwrap();

        store.create(Some("First")).await;
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn delete_then_get_reports_not_found() {
        let mut store = empty_store().await;
        let id = store.create(None).await;

        store.delete(id).await;
        assert!(store.get(id).is_none());
    }

    #[tokio::test]
    async fn delete_of_absent_id_is_a_noop() {
        let mut store = empty_store().await;
        store.create(None).await;

        store.delete(ConversationId::new()).await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn deleting_selected_conversation_falls_back_to_first_listed() {
        let mut store = empty_store().await;
        let a = store.create(Some("A")).await;
        let b = store.create(Some("B")).await;
        let c = store.create(Some("C")).await;

        // List order is most-recent-first: [C, B, A].
        store.select(b).unwrap();
        store.delete(b).await;

        assert_eq!(store.current(), Some(c));
        let ids: Vec<ConversationId> = store.list().iter().map(|x| x.id()).collect();
        assert_eq!(ids, vec![c, a]);
    }

    #[tokio::test]
    async fn deleting_last_conversation_clears_selection() {
        let mut store = empty_store().await;
        let id = store.create(None).await;

        store.delete(id).await;
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn deleting_unselected_conversation_keeps_selection() {
        let mut store = empty_store().await;
        let a = store.create(Some("A")).await;
        let b = store.create(Some("B")).await;

        store.select(a).unwrap();
        store.delete(b).await;
        assert_eq!(store.current(), Some(a));
    }

    #[tokio::test]
    async fn select_of_absent_id_fails() {
        let mut store = empty_store().await;
        let result = store.select(ConversationId::new());
        assert!(matches!(result, Err(StoreError::ConversationNotFound(_))));
    }

    #[tokio::test]
    async fn list_puts_pinned_conversations_first() {
        let mut store = empty_store().await;
        let a = store.create(Some("A")).await;
        let b = store.create(Some("B")).await;
        let c = store.create(Some("C")).await;

        store
            .update(
                a,
                ConversationUpdate {
                    pinned: Some(true),
                    ..ConversationUpdate::default()
                },
            )
            .await
            .unwrap();

        let ids: Vec<ConversationId> = store.list().iter().map(|x| x.id()).collect();
        assert_eq!(ids, vec![a, c, b]);
    }

    #[tokio::test]
    async fn update_renames_and_bumps_updated_at() {
        let mut store = empty_store().await;
        let id = store.create(Some("Before")).await;
        let created = store.get(id).unwrap().created_at();

        store
            .update(
                id,
                ConversationUpdate {
                    title: Some("After".to_string()),
                    ..ConversationUpdate::default()
                },
            )
            .await
            .unwrap();

        let conv = store.get(id).unwrap();
        assert_eq!(conv.title(), "After");
        assert!(!conv.updated_at().is_before(&created));
    }

    #[tokio::test]
    async fn update_of_absent_id_fails() {
        let mut store = empty_store().await;
        let result = store
            .update(ConversationId::new(), ConversationUpdate::default())
            .await;
        assert!(matches!(result, Err(StoreError::ConversationNotFound(_))));
    }

    #[tokio::test]
    async fn update_rejects_overlong_titles() {
        let config = StoreConfig {
            max_title_chars: 8,
            ..StoreConfig::default()
        };
        let mut store = ConversationStore::open(Arc::new(InMemoryStorage::new()), config)
            .await
            .unwrap();
        let id = store.create(None).await;

        let result = store
            .update(
                id,
                ConversationUpdate {
                    title: Some("way too long a title".to_string()),
                    ..ConversationUpdate::default()
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[tokio::test]
    async fn search_matches_title_and_message_content() {
        let mut store = empty_store().await;
        let rust = store.create(Some("Rust questions")).await;
        let other = store.create(Some("Groceries")).await;
        store
            .append_user_message(other, "remember the borrow checker talk")
            .await
            .unwrap();

        let hits: Vec<ConversationId> = store.search("BORROW").iter().map(|c| c.id()).collect();
        assert_eq!(hits, vec![other]);

        let hits: Vec<ConversationId> = store.search("rust").iter().map(|c| c.id()).collect();
        assert_eq!(hits, vec![rust]);
    }

    #[tokio::test]
    async fn blank_search_returns_full_list() {
        let mut store = empty_store().await;
        store.create(Some("A")).await;
        store.create(Some("B")).await;

        assert_eq!(store.search("   ").len(), 2);
    }

    #[tokio::test]
    async fn whitespace_only_message_is_rejected_and_nothing_is_appended() {
        let mut store = empty_store().await;
        let id = store.create(None).await;

        let result = store.append_user_message(id, "  ").await;
        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert_eq!(store.get(id).unwrap().message_count(), 0);
    }

    #[tokio::test]
    async fn second_placeholder_fails_with_state_conflict() {
        let mut store = empty_store().await;
        let id = store.create(None).await;
        store.append_user_message(id, "Hello").await.unwrap();
        store.append_assistant_placeholder(id).await.unwrap();

        let result = store.append_assistant_placeholder(id).await;
        assert!(matches!(result, Err(StoreError::StateConflict(_))));
    }

    #[tokio::test]
    async fn delete_message_is_idempotent_at_both_levels() {
        let mut store = empty_store().await;
        let id = store.create(None).await;
        let message_id = store.append_user_message(id, "Hello").await.unwrap();

        store.delete_message(id, message_id).await;
        store.delete_message(id, message_id).await;
        assert_eq!(store.get(id).unwrap().message_count(), 0);

        // Absent conversation is a no-op too.
        store.delete_message(ConversationId::new(), message_id).await;
    }

    #[tokio::test]
    async fn open_selects_first_listed_conversation() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut store = ConversationStore::open(storage.clone(), StoreConfig::default())
            .await
            .unwrap();
        store.create(Some("A")).await;
        let b = store.create(Some("B")).await;

        let reopened = ConversationStore::open(storage, StoreConfig::default())
            .await
            .unwrap();
        assert_eq!(reopened.current(), Some(b));
    }

    #[tokio::test]
    async fn open_on_empty_storage_has_no_selection() {
        let store = empty_store().await;
        assert!(store.is_empty());
        assert_eq!(store.current(), None);
    }
}
