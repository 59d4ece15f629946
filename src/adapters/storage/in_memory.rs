//! In-memory storage adapter.
//!
//! Holds the snapshot in a mutex-guarded vector. Used by tests and by
//! sessions that do not want durability.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::conversation::Conversation;
use crate::ports::{ConversationStorage, StorageError};

/// Ephemeral conversation storage.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    snapshot: Mutex<Vec<Conversation>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-seeded with conversations.
    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            snapshot: Mutex::new(conversations),
        }
    }
}

#[async_trait]
impl ConversationStorage for InMemoryStorage {
    async fn load(&self) -> Result<Vec<Conversation>, StorageError> {
        Ok(self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?
            .clone())
    }

    async fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError> {
        *self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))? = conversations.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let storage = InMemoryStorage::new();
        let conversations = vec![Conversation::new(Some("A")), Conversation::new(Some("B"))];

        storage.save(&conversations).await.unwrap();
        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded, conversations);
    }

    #[tokio::test]
    async fn fresh_storage_loads_empty() {
        let storage = InMemoryStorage::new();
        assert!(storage.load().await.unwrap().is_empty());
    }
}
