use super::prompts::{SYSTEM_PROMPT, follow_up_prompt, initial_prompt};
use super::reconcile::merge_round;
use super::response::{DiscoveryPayload, parse_payload};
use crate::config::Config;
use crate::error::Result;
use crate::llm::{CompletionBackend, CompletionRequest, OpenRouterClient};
use crate::models::DiscoveryResult;
use crate::observer::DiscoveryObserver;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Hard ceiling on request rounds per company.
pub const MAX_ROUNDS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    pub max_rounds: usize,
    /// How many known endpoints are quoted back in follow-up prompts.
    pub exclusion_limit: usize,
    pub follow_up_batch: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_rounds: MAX_ROUNDS,
            exclusion_limit: 30,
            follow_up_batch: 15,
        }
    }
}

impl DiscoveryOptions {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.clamp(1, MAX_ROUNDS);
        self
    }
}

/// Builds an endpoint inventory by repeatedly asking a completion service for more endpoints.
pub struct AiDiscoveryAgent {
    backend: Arc<dyn CompletionBackend>,
    options: DiscoveryOptions,
    observer: Arc<dyn DiscoveryObserver>,
}

impl AiDiscoveryAgent {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        options: DiscoveryOptions,
        observer: Arc<dyn DiscoveryObserver>,
    ) -> Self {
        Self {
            backend,
            options,
            observer,
        }
    }

    /// Creates an agent backed by OpenRouter. Fails when no API key is configured.
    pub fn from_env(
        timeout: Duration,
        options: DiscoveryOptions,
        observer: Arc<dyn DiscoveryObserver>,
    ) -> Result<Self> {
        let config = Config::from_env()?;
        let client = OpenRouterClient::new(&config, timeout)?;
        tracing::info!(model = client.model(), "AI discovery agent initialized");
        Ok(Self::new(Arc::new(client), options, observer))
    }

    #[instrument(skip_all, fields(company = %company_name))]
    pub async fn discover(&self, company_name: &str) -> DiscoveryResult {
        self.observer.round_started(1);
        let payload = match self.request(initial_prompt(company_name)).await {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.to_string();
                self.observer.round_failed(1, &message);
                return DiscoveryResult {
                    rounds: 1,
                    ..DiscoveryResult::empty(company_name, message)
                };
            }
        };

        let mut result = DiscoveryResult {
            company_name: company_name.to_string(),
            has_api: payload.has_api,
            api_type: payload.api_type.trim().to_string(),
            base_url: payload.base_url.trim().to_string(),
            rounds: 1,
            ..DiscoveryResult::default()
        };

        if !result.has_api {
            self.observer.round_finished(1, 0, 0);
            return result;
        }

        let mut added = merge_round(&mut result.endpoints, payload.endpoints);
        self.observer.round_finished(1, added, result.endpoints.len());

        while added > 0 && result.rounds < self.options.max_rounds {
            let round = result.rounds + 1;
            result.rounds = round;
            self.observer.round_started(round);

            let prompt = follow_up_prompt(
                company_name,
                result.endpoints.as_slice(),
                self.options.follow_up_batch,
                self.options.exclusion_limit,
            );

            added = match self.request(prompt).await {
                Ok(payload) => {
                    let added = merge_round(&mut result.endpoints, payload.endpoints);
                    self.observer.round_finished(round, added, result.endpoints.len());
                    added
                }
                Err(err) => {
                    self.observer.round_failed(round, &err.to_string());
                    0
                }
            };
        }

        result
    }

    async fn request(&self, prompt: String) -> Result<DiscoveryPayload> {
        let request = CompletionRequest::new(SYSTEM_PROMPT, prompt);
        let content = self.backend.complete(&request).await?;
        parse_payload(&content)
    }
}
