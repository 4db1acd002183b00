mod client;
mod openrouter_client;

pub use client::{CompletionBackend, CompletionRequest};
pub use openrouter_client::OpenRouterClient;
