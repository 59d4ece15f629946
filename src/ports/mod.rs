//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the store and the outside world. Adapters implement these ports.
//!
//! - `ConversationStorage` - durable persistence for the conversation list
//! - `AssistantProvider` - completion backend for assistant responses

mod assistant_provider;
mod conversation_storage;

pub use assistant_provider::{
    AssistantError, AssistantProvider, ChatMessage, ChatRole, CompletionRequest,
    CompletionResponse,
};
pub use conversation_storage::{ConversationStorage, StorageError};
