use crate::error::Result;
use async_trait::async_trait;

/// One chat turn sent to a completion service: a system instruction plus the user prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the raw message content of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
