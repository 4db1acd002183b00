use super::doc_locator::{PROBE_TIMEOUT, candidate_urls, looks_like_api_docs};
use super::extractor::extract_endpoints;
use super::fetcher::{HttpFetcher, PageFetcher};
use crate::models::ApiEndpoint;
use crate::observer::{DiscoveryObserver, ProbeOutcome};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Heuristic pipeline: guess the documentation URL, then scrape endpoints from it.
pub struct DocsScraper {
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn DiscoveryObserver>,
}

impl DocsScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, observer: Arc<dyn DiscoveryObserver>) -> Self {
        Self { fetcher, observer }
    }

    pub fn with_http(observer: Arc<dyn DiscoveryObserver>) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?), observer))
    }

    /// Probes the candidate URLs in order and returns the first that looks like API documentation.
    #[instrument(skip_all, fields(company = %company_name))]
    pub async fn locate_documentation(&self, company_name: &str) -> Option<String> {
        for url in candidate_urls(company_name) {
            let outcome = match self.fetcher.fetch(&url, PROBE_TIMEOUT).await {
                Ok(page) if !page.is_ok() => ProbeOutcome::Status(page.status),
                Ok(page) if looks_like_api_docs(&page.body) => ProbeOutcome::Accepted,
                Ok(_) => ProbeOutcome::MissingKeywords,
                Err(err) => {
                    debug!(%url, error = %err, "Probe failed");
                    ProbeOutcome::Failed
                }
            };

            self.observer.url_probed(&url, outcome);
            if outcome == ProbeOutcome::Accepted {
                return Some(url);
            }
        }

        warn!("Could not find API documentation");
        None
    }

    /// Fetches a documentation page and extracts endpoints. Any failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn extract_from_url(&self, url: &str) -> Vec<ApiEndpoint> {
        let endpoints = match self.fetcher.fetch(url, PAGE_TIMEOUT).await {
            Ok(page) if page.is_success() => extract_endpoints(&page.body),
            Ok(page) => {
                error!(status = page.status, "Documentation page returned an error status");
                Vec::new()
            }
            Err(err) => {
                error!(error = %err, "Error extracting endpoints");
                Vec::new()
            }
        };

        self.observer.endpoints_extracted(url, endpoints.len());
        endpoints
    }

    pub async fn discover_api(&self, company_name: &str) -> (Option<String>, Vec<ApiEndpoint>) {
        let Some(doc_url) = self.locate_documentation(company_name).await else {
            return (None, Vec::new());
        };

        let endpoints = self.extract_from_url(&doc_url).await;
        (Some(doc_url), endpoints)
    }
}
