//! The HTML-to-links extractor consumed by `CrawlEngine`.
//!
//! Not a real HTML parser — the engine only depends on the
//! `LinkExtractor` trait. `RegexLinkExtractor` is a minimal reference
//! implementation good enough to drive the engine end to end; a fuller
//! parser can be swapped in behind the same trait without engine
//! changes.

use regex::Regex;
use url::Url;

/// Pure: `get_links(base_uri, html_text) -> outbound URIs`. The engine
/// supplies `base_uri` for relative-URL resolution.
pub trait LinkExtractor: Send + Sync {
    fn get_links(&self, base_uri: &Url, html_text: &str) -> Vec<Url>;
}

/// Pulls `href="..."` / `href='...'` targets out of anchor tags with a
/// single regex pass, resolves them against `base_uri`, and drops
/// anything that fails to parse as an absolute URI.
pub struct RegexLinkExtractor {
    href_pattern: Regex,
}

impl RegexLinkExtractor {
    pub fn new() -> Self {
        Self {
            href_pattern: Regex::new(r#"(?i)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)
                .expect("href_pattern is a fixed, valid regex"),
        }
    }
}

impl Default for RegexLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for RegexLinkExtractor {
    fn get_links(&self, base_uri: &Url, html_text: &str) -> Vec<Url> {
        self.href_pattern
            .captures_iter(html_text)
            .filter_map(|cap| cap.get(1))
            .filter_map(|m| base_uri.join(m.as_str()).ok())
            .filter(|url| url.scheme() == "http" || url.scheme() == "https")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn extracts_and_resolves_relative_links() {
        let base = Url::from_str("https://a.com/dir/page.html").unwrap();
        let html = r#"
            <a href="/about">About</a>
            <a href='https://a.com/contact'>Contact</a>
            <a href="sibling.html">Sibling</a>
            <a href="mailto:hi@a.com">Mail</a>
        "#;

        let links = RegexLinkExtractor::new().get_links(&base, html);
        let as_strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert!(as_strings.contains(&"https://a.com/about".to_string()));
        assert!(as_strings.contains(&"https://a.com/contact".to_string()));
        assert!(as_strings.contains(&"https://a.com/dir/sibling.html".to_string()));
        assert!(!as_strings.iter().any(|s| s.starts_with("mailto:")));
    }

    #[test]
    fn returns_nothing_for_html_with_no_anchors() {
        let base = Url::from_str("https://a.com/").unwrap();
        let links = RegexLinkExtractor::new().get_links(&base, "<p>no links here</p>");
        assert!(links.is_empty());
    }
}
