//! Mock assistant provider for tests and offline sessions.
//!
//! Configurable to return scripted responses in order, simulate latency, or
//! inject errors, and records every request for verification.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AssistantError, AssistantProvider, CompletionRequest, CompletionResponse};

/// A scripted outcome, consumed in order.
#[derive(Debug, Clone)]
enum Scripted {
    Response(String),
    Error(AssistantError),
}

/// Mock assistant backend.
#[derive(Debug, Clone, Default)]
pub struct MockAssistantProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockAssistantProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Scripted::Response(content.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: AssistantError) -> Self {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Scripted::Error(error));
        self
    }

    /// Simulates latency on every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every request seen so far, in call order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().expect("mock call lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock call lock poisoned").len()
    }
}

#[async_trait]
impl AssistantProvider for MockAssistantProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AssistantError> {
        self.calls
            .lock()
            .expect("mock call lock poisoned")
            .push(request);

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        let next = self
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();
        match next {
            Some(Scripted::Response(content)) => Ok(CompletionResponse { content }),
            Some(Scripted::Error(error)) => Err(error),
            None => Err(AssistantError::InvalidResponse(
                "mock has no scripted response left".to_string(),
            )),
        }
    }
}
