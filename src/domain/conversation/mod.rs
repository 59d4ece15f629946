//! Conversation module - chat threads and their messages.
//!
//! A `Conversation` exclusively owns its `Message`s; deleting a conversation
//! deletes everything in it. The entity enforces the message lifecycle rules
//! (single in-flight placeholder, regenerate only where permitted) so the
//! store above it only deals with lookup and selection.

mod conversation;
mod errors;
mod message;

pub use conversation::{Conversation, DEFAULT_TITLE};
pub use errors::StoreError;
pub use message::{Message, MessageStatus, Role};
