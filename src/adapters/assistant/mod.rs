//! Assistant provider adapters.

mod mock;

pub use mock::MockAssistantProvider;
