//! Conversation storage port.
//!
//! Defines the contract for persisting the conversation collection. The
//! store calls `load` once at initialization and `save` after every
//! mutating operation; durability is best-effort, so a failed `save` is
//! logged by the caller and never rolls back in-memory state.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::Conversation;

/// Errors reported by storage adapters.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Underlying I/O failed (permissions, disk, ...).
    #[error("I/O error: {0}")]
    Io(String),

    /// The stored snapshot exists but could not be decoded.
    #[error("Corrupted snapshot: {0}")]
    Corrupted(String),
}

/// Port for durable persistence of the conversation collection.
///
/// Implementations must preserve conversation order: `load` after `save`
/// yields an equivalent sequence (same ids, titles, messages, timestamps).
#[async_trait]
pub trait ConversationStorage: Send + Sync {
    /// Loads the most recently saved conversation collection.
    ///
    /// A missing snapshot is not an error: implementations return an empty
    /// list so a fresh session starts with an empty store.
    async fn load(&self) -> Result<Vec<Conversation>, StorageError>;

    /// Persists the full conversation collection.
    async fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError>;
}
