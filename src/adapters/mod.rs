//! Adapters - Implementations of the ports.
//!
//! - `storage` - filesystem and in-memory persistence
//! - `assistant` - mock completion backend for tests and offline use

pub mod assistant;
pub mod storage;
