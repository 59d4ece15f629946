//! Parlour - Conversation store for AI chat frontends
//!
//! This crate implements the conversation/session state behind a chat UI:
//! conversation CRUD, deterministic active-conversation selection, message
//! lifecycle (append, resolve, regenerate), and best-effort local persistence.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
