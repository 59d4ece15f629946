//! Application layer - the store and its command handlers.
//!
//! The store orchestrates the domain entities and coordinates with the
//! ports; the handlers wrap the multi-step send and regenerate flows.

mod regenerate_response;
mod send_message;
mod store;

pub use regenerate_response::{
    RegenerateResponseCommand, RegenerateResponseHandler, RegenerateResponseResult,
};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};
pub use store::{ConversationStore, ConversationUpdate};
