//! Error codes for the domain layer.

use std::fmt;

/// Error codes organized by category.
///
/// Every recoverable failure in the store maps to exactly one code, which
/// callers (a UI layer, typically) can use to pick a presentation: inline
/// validation notice, toast, silent retry, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Not found errors
    ConversationNotFound,
    MessageNotFound,

    // Validation errors
    ValidationFailed,

    // State errors
    StateConflict,

    // Collaborator errors
    BackendError,
    StorageError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::MessageNotFound => "MESSAGE_NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::StateConflict => "STATE_CONFLICT",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
        };
        write!(f, "{}", s)
    }
}
