//! RegenerateResponse command handler.
//!
//! Re-runs the assistant completion for an existing message: the message
//! re-enters its pending state in place (no new placeholder), the backend is
//! asked again with the history that preceded the message, and the outcome
//! is applied with the same mid-flight cancellation tolerance as the send
//! flow.

use std::sync::Arc;

use crate::application::send_message::{apply_outcome, build_request};
use crate::application::ConversationStore;
use crate::domain::conversation::StoreError;
use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::AssistantProvider;

/// Command to regenerate an assistant response.
#[derive(Debug, Clone)]
pub struct RegenerateResponseCommand {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
}

/// Result of a completed regenerate flow.
#[derive(Debug, Clone)]
pub struct RegenerateResponseResult {
    pub message_id: MessageId,
    /// Backend failure reason, if the message ended up failed again.
    pub backend_error: Option<String>,
}

/// Handler for the regenerate flow.
pub struct RegenerateResponseHandler {
    provider: Arc<dyn AssistantProvider>,
}

impl RegenerateResponseHandler {
    pub fn new(provider: Arc<dyn AssistantProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        store: &mut ConversationStore,
        cmd: RegenerateResponseCommand,
    ) -> Result<RegenerateResponseResult, StoreError> {
        // 1. Re-enter pending state (checks can_regenerate and the
        //    single-pending invariant)
        store
            .regenerate_message(cmd.conversation_id, cmd.message_id)
            .await?;

        // 2. Rebuild the request from the history preceding the message
        let request = match store.get(cmd.conversation_id) {
            Some(conversation) => build_request(conversation, cmd.message_id),
            None => return Err(StoreError::conversation_not_found(cmd.conversation_id)),
        };

        // 3. Ask the backend and apply the outcome
        let outcome = self.provider.complete(request).await;
        let backend_error = apply_outcome(
            store,
            cmd.conversation_id,
            cmd.message_id,
            outcome.map(|r| r.content),
        )
        .await?;

        Ok(RegenerateResponseResult {
            message_id: cmd.message_id,
            backend_error,
        })
    }
}
