//! Progress reporting for the discovery pipelines.
//!
//! Pipelines receive an observer at construction instead of writing to a
//! process-wide logger, so callers decide where progress goes.

use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted,
    MissingKeywords,
    Status(u16),
    Failed,
}

pub trait DiscoveryObserver: Send + Sync {
    fn round_started(&self, _round: usize) {}

    fn round_finished(&self, _round: usize, _new_endpoints: usize, _total: usize) {}

    fn round_failed(&self, _round: usize, _error: &str) {}

    fn url_probed(&self, _url: &str, _outcome: ProbeOutcome) {}

    fn endpoints_extracted(&self, _url: &str, _count: usize) {}
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DiscoveryObserver for TracingObserver {
    fn round_started(&self, round: usize) {
        info!(round, "Requesting endpoints from completion service");
    }

    fn round_finished(&self, round: usize, new_endpoints: usize, total: usize) {
        info!(round, new_endpoints, total, "Round complete");
    }

    fn round_failed(&self, round: usize, error: &str) {
        warn!(round, %error, "Round failed");
    }

    fn url_probed(&self, url: &str, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Accepted => info!(%url, "Found API documentation"),
            ProbeOutcome::Status(status) => debug!(%url, status, "Candidate returned an error status"),
            ProbeOutcome::MissingKeywords => debug!(%url, "Candidate does not look like API documentation"),
            ProbeOutcome::Failed => debug!(%url, "Could not access candidate"),
        }
    }

    fn endpoints_extracted(&self, url: &str, count: usize) {
        if count == 0 {
            warn!(%url, "No endpoints found");
        } else {
            info!(%url, count, "Extracted endpoints");
        }
    }
}

pub fn tracing_observer() -> Arc<dyn DiscoveryObserver> {
    Arc::new(TracingObserver)
}
