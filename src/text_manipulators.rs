use url::Url;
use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Trims the text and folds any run of whitespace (markup newlines, tabs,
/// non-breaking spaces) into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn resolve_link(base_url: &Url, href: &str) -> Result<Url, url::ParseError> {
    base_url.join(href)
}
