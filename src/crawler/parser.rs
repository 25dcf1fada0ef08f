//! HTML link extraction
//!
//! Pulls the raw `href` value of every `<a>` element out of a page body, in
//! document order. Nothing is resolved or filtered here; the engine hands
//! each value to the [`LinkResolver`](crate::url::LinkResolver).

use crate::crawler::LinkExtractor;
use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Raw `href` values of anchor elements, in document order
    pub hrefs: Vec<String>,
}

/// Parses HTML content and extracts anchor targets and the title
///
/// Parsing is lenient: malformed markup yields whatever anchors the HTML5
/// parser recovers, never an error.
///
/// # Example
///
/// ```
/// use sitegraph::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.hrefs, vec!["/page"]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        hrefs: extract_hrefs(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the `href` attribute of every anchor, untouched
fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Link extractor for HTML bodies, backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Vec<String> {
        let parsed = parse_html(body);
        if let Some(title) = &parsed.title {
            tracing::trace!("Parsed page \"{}\" with {} anchors", title, parsed.hrefs.len());
        }
        parsed.hrefs
    }
}
