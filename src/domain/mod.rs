//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, timestamps, error codes)
//! - `conversation` - Conversation and Message entities plus store errors

pub mod conversation;
pub mod foundation;
