use scraper::Html;
use std::time::Duration;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const DOC_KEYWORDS: [&str; 5] = ["api", "endpoint", "rest", "graphql", "documentation"];

/// Lowercased company name with all whitespace removed, e.g. `"Example Corp"` → `"examplecorp"`.
pub fn company_slug(company_name: &str) -> String {
    company_name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase()
}

/// Candidate documentation URLs, in the order they are probed.
pub fn candidate_urls(company_name: &str) -> Vec<String> {
    let slug = company_slug(company_name);
    vec![
        format!("https://api.{slug}.com"),
        format!("https://developer.{slug}.com"),
        format!("https://docs.{slug}.com"),
        format!("https://{slug}.com/api"),
        format!("https://{slug}.com/docs"),
        format!("https://{slug}.com/developers"),
        format!("https://www.{slug}.com/api"),
    ]
}

/// Visible text of an HTML (or plain text) document.
pub fn page_text(body: &str) -> String {
    Html::parse_document(body)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn looks_like_api_docs(body: &str) -> bool {
    let text = page_text(body).to_lowercase();
    DOC_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}
