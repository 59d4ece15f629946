//! Storage adapters for the conversation collection.

mod filesystem;
mod in_memory;

pub use filesystem::FsConversationStorage;
pub use in_memory::InMemoryStorage;
