mod doc_locator;
mod docs_scraper;
mod extractor;
pub mod fetcher;

pub use docs_scraper::DocsScraper;
