//! Heuristic endpoint extraction from documentation HTML.
//!
//! Four independent passes look for `METHOD /path` shapes: code blocks,
//! table rows, headings and links, and absolute URLs anywhere in the page
//! text. Results are unioned and deduplicated by (method, path); the first
//! pass to find a key supplies its description.

use crate::models::{ApiEndpoint, EndpointSet};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const DESCRIPTION_LIMIT: usize = 200;

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s+(/[\w\-/{}:]*)").unwrap()
});

static TABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(GET|POST|PUT|DELETE|PATCH)\s+(/[\w\-/{}:]*)").unwrap());

static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b(GET|POST|PUT|DELETE|PATCH)\s+)?(/api[\w\-/{}:]*|/v\d+[\w\-/{}:]*)").unwrap()
});

static ABSOLUTE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(GET|POST|PUT|DELETE|PATCH)\s+(https?://\S+/api\S*)").unwrap()
});

/// Extracts candidate endpoints from an HTML document. Never fails; unusable input yields nothing.
pub fn extract_endpoints(html: &str) -> Vec<ApiEndpoint> {
    let document = Html::parse_document(html);
    let mut found = EndpointSet::new();

    scan_code_blocks(&document, &mut found);
    scan_table_rows(&document, &mut found);
    scan_headings_and_links(&document, &mut found);
    scan_absolute_urls(&document, &mut found);

    found.into_vec()
}

fn scan_code_blocks(document: &Html, found: &mut EndpointSet) {
    for block in select(document, "code, pre") {
        let text = block.text().collect::<String>();
        for caps in CODE_PATTERN.captures_iter(&text) {
            found.insert(ApiEndpoint::new(&caps[1], &caps[2], enclosing_text(block)));
        }
    }
}

fn scan_table_rows(document: &Html, found: &mut EndpointSet) {
    let Ok(cell_selector) = Selector::parse("td, th") else {
        return;
    };

    for row in select(document, "tr") {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() < 2 {
            continue;
        }

        let row_text = cells.join(" ");
        for caps in TABLE_PATTERN.captures_iter(&row_text) {
            found.insert(ApiEndpoint::new(&caps[1], &caps[2], enclosing_text(row)));
        }
    }
}

fn scan_headings_and_links(document: &Html, found: &mut EndpointSet) {
    for element in select(document, "h1, h2, h3, h4, h5, h6, a") {
        let text = element.text().collect::<String>();
        for caps in HEADING_PATTERN.captures_iter(&text) {
            let method = caps.get(1).map_or("GET", |m| m.as_str());
            found.insert(ApiEndpoint::new(method, &caps[2], enclosing_text(element)));
        }
    }
}

fn scan_absolute_urls(document: &Html, found: &mut EndpointSet) {
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    for caps in ABSOLUTE_URL_PATTERN.captures_iter(&text) {
        if let Some(path) = url_path(&caps[2]) {
            found.insert(ApiEndpoint::new(&caps[1], path, String::new()));
        }
    }
}

fn select<'a>(document: &'a Html, selectors: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selectors) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Path component of an absolute URL, without query or fragment.
fn url_path(url: &str) -> Option<&str> {
    let after_scheme = &url[url.find("://")? + 3..];
    let path = &after_scheme[after_scheme.find('/')?..];
    let end = path.find(['?', '#']).unwrap_or(path.len());
    Some(&path[..end])
}

/// Whitespace-collapsed text of the parent element, capped at 200 characters.
fn enclosing_text(element: ElementRef<'_>) -> String {
    let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
        return String::new();
    };

    let text = parent.text().collect::<Vec<_>>().join(" ");
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(DESCRIPTION_LIMIT)
        .collect()
}
