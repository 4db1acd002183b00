mod agent;
mod prompts;
mod reconcile;
mod response;

pub use agent::{AiDiscoveryAgent, DiscoveryOptions, MAX_ROUNDS};
