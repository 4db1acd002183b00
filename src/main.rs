mod config;
mod discovery;
mod error;
mod export;
mod llm;
mod models;
mod observer;
mod pipeline;
mod scraper;

use crate::discovery::{AiDiscoveryAgent, DiscoveryOptions, MAX_ROUNDS};
use crate::export::SpreadsheetExporter;
use crate::observer::tracing_observer;
use crate::pipeline::Source;
use crate::scraper::DocsScraper;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-discovery")]
#[command(about = "Discover a company's public API endpoints and export them to a spreadsheet")]
#[command(after_help = "Examples:\n  api-discovery Stripe\n  api-discovery GitHub --output github_api.xlsx\n  api-discovery Twilio --strategy scrape --verbose\n\nThe ai strategy requires OPENROUTER_API_KEY to be set.")]
struct Cli {
    /// Company or product name to search for
    company: String,

    /// Output spreadsheet path (auto-generated if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// How endpoints are discovered
    #[arg(long, value_enum, default_value_t = Strategy::Ai)]
    strategy: Strategy,

    /// Maximum completion rounds for the ai strategy (1-5)
    #[arg(long, default_value_t = MAX_ROUNDS)]
    max_rounds: usize,

    /// Completion request timeout in seconds
    #[arg(long, env = "API_DISCOVERY_TIMEOUT", default_value_t = 15)]
    timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Ask a hosted language model, iterating until no new endpoints appear
    Ai,
    /// Guess documentation URLs and scrape endpoint patterns from the HTML
    Scrape,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tokio::select! {
        outcome = run(&cli) => match outcome {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{err:#}");
                ExitCode::from(1)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Operation cancelled by user");
            ExitCode::from(130)
        }
    }
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_target(false)
        .init();
}

/// `RUST_LOG` wins when set and valid; otherwise `--verbose` picks the default.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_directives = if verbose { "api_discovery=debug,info" } else { "info" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives))
}

async fn run(cli: &Cli) -> Result<PathBuf> {
    info!(company = %cli.company, strategy = ?cli.strategy, "Searching for API documentation");

    let exporter = SpreadsheetExporter::default();
    match cli.strategy {
        Strategy::Ai => {
            let options = DiscoveryOptions::default().with_max_rounds(cli.max_rounds);
            let agent = AiDiscoveryAgent::from_env(Duration::from_secs(cli.timeout), options, tracing_observer())?;
            pipeline::run(Source::Ai(&agent), &cli.company, &exporter, cli.output.clone()).await
        }
        Strategy::Scrape => {
            let scraper = DocsScraper::with_http(tracing_observer())?;
            pipeline::run(Source::Scrape(&scraper), &cli.company, &exporter, cli.output.clone()).await
        }
    }
}
