//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier value objects, timestamps, and error codes
//! that form the vocabulary of the conversation store.

mod errors;
mod ids;
mod timestamp;

pub use errors::ErrorCode;
pub use ids::{ConversationId, MessageId};
pub use timestamp::Timestamp;
