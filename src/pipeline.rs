//! Runs one discovery strategy and exports what it found.
//!
//! A run that finds no API writes nothing. A documentation page that
//! yields no endpoints still produces a workbook with a placeholder row.

use crate::discovery::AiDiscoveryAgent;
use crate::export::{SpreadsheetExporter, placeholder_endpoint};
use crate::models::DiscoveryResult;
use crate::scraper::DocsScraper;
use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::{info, warn};

pub enum Source<'a> {
    Ai(&'a AiDiscoveryAgent),
    Scrape(&'a DocsScraper),
}

pub async fn run(
    source: Source<'_>,
    company_name: &str,
    exporter: &SpreadsheetExporter,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let result = match source {
        Source::Ai(agent) => discover_with_ai(agent, company_name).await?,
        Source::Scrape(scraper) => discover_with_scraper(scraper, company_name).await?,
    };

    let path = exporter.output_path(company_name, output);
    let written = exporter.write(&result, &path)?;

    info!(
        company = %result.company_name,
        api_type = %result.api_type,
        base_url = %result.base_url,
        endpoints = result.endpoints.len(),
        rounds = result.rounds,
        output = %written.display(),
        "API information saved to spreadsheet"
    );

    Ok(written)
}

async fn discover_with_ai(agent: &AiDiscoveryAgent, company_name: &str) -> Result<DiscoveryResult> {
    let result = agent.discover(company_name).await;
    if !result.has_api {
        match &result.error {
            Some(reason) => bail!("No public API found for '{company_name}': {reason}"),
            None => bail!("No public API found for '{company_name}'"),
        }
    }

    if result.endpoints.is_empty() {
        warn!("API reported but no endpoints were returned");
    }

    Ok(result)
}

async fn discover_with_scraper(scraper: &DocsScraper, company_name: &str) -> Result<DiscoveryResult> {
    let (doc_url, mut endpoints) = scraper.discover_api(company_name).await;
    let Some(doc_url) = doc_url else {
        bail!("Could not find API documentation for '{company_name}'");
    };

    if endpoints.is_empty() {
        warn!(url = %doc_url, "No endpoints were automatically extracted; writing a placeholder row");
        endpoints.push(placeholder_endpoint(&doc_url));
    }

    Ok(DiscoveryResult::from_scrape(company_name, &doc_url, endpoints))
}
