use crate::error::{DiscoveryError, Result};
use std::env;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";

/// Settings for the completion-service path, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables, honoring a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_key: non_empty("OPENROUTER_API_KEY").ok_or(DiscoveryError::MissingApiKey)?,
            api_url: non_empty("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: non_empty("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}
