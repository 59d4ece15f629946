//! Filesystem storage adapter for the conversation snapshot.
//!
//! Stores the whole collection as one JSON file. Writes go through a
//! temporary file followed by a rename, so a crash mid-write never leaves a
//! half-written snapshot behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::conversation::Conversation;
use crate::ports::{ConversationStorage, StorageError};

/// JSON-file-backed conversation storage.
pub struct FsConversationStorage {
    path: PathBuf,
}

impl FsConversationStorage {
    /// Creates storage backed by the given snapshot file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates storage at the snapshot path named in the configuration,
    /// or `None` when no path is configured.
    pub fn from_config(config: &crate::config::StoreConfig) -> Option<Self> {
        config.snapshot_path.as_ref().map(Self::new)
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_exists(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(format!("Failed to create directory: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStorage for FsConversationStorage {
    async fn load(&self) -> Result<Vec<Conversation>, StorageError> {
        // A missing snapshot means a fresh session, not an error.
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(format!("Failed to read snapshot: {}", e))),
        };

        serde_json::from_str(&raw)
            .map_err(|e| StorageError::Corrupted(format!("Failed to decode snapshot: {}", e)))
    }

    async fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError> {
        self.ensure_parent_exists().await?;

        let raw = serde_json::to_string_pretty(conversations)
            .map_err(|e| StorageError::Io(format!("Failed to encode snapshot: {}", e)))?;

        // Write to a temporary file, then rename (atomic on Unix).
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, raw)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to write temporary file: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to rename snapshot: {}", e)))?;

        Ok(())
    }
}
