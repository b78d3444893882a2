use super::{PlatformId, PlatformStrategy};
use crate::discover::LinkSource;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Sidebar-like containers, most specific first. Header and footer navs
/// never count as a sidebar.
const SIDEBAR_SELECTORS: &[&str] = &[
    "aside nav a[href]",
    "aside a[href]",
    "[class*='sidebar'] a[href]",
    "[class*='side-bar'] a[href]",
    "[role='complementary'] a[href]",
    "[class*='toc'] a[href]",
    "[class*='table-of-contents'] a[href]",
];

/// A selector needs at least this many links to count as a sidebar.
const MIN_SIDEBAR_LINKS: usize = 3;

pub struct Generic;

impl PlatformStrategy for Generic {
    fn id(&self) -> PlatformId {
        PlatformId::Generic
    }

    fn detect(&self, _url: &Url, _document: &Html) -> bool {
        true
    }

    fn content_selector(&self) -> &'static str {
        "article, main, [role='main'], .content"
    }

    fn remove_selectors(&self) -> &'static [&'static str] {
        &[
            "nav",
            "header",
            "footer",
            "[role='navigation']",
            "[class*='sidebar']",
            "[class*='cookie']",
            "[class*='banner']",
            "script",
            "style",
            "noscript",
        ]
    }

    fn link_source(&self) -> LinkSource {
        LinkSource::Custom(discover_urls)
    }
}

/// Links from the first sidebar-like container with enough entries. Returns
/// nothing when no sidebar is found so the crawl keeps its tight prefix.
pub fn discover_urls(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    SIDEBAR_SELECTORS
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .map(|selector| sidebar_links(&document, base_url, &selector))
        .find(|links| links.len() >= MIN_SIDEBAR_LINKS)
        .unwrap_or_default()
}

/// Resolved, deduplicated hrefs under `selector`. In-page anchors and
/// `mailto:` links are skipped before resolution.
fn sidebar_links(document: &Html, base_url: &Url, selector: &Selector) -> Vec<String> {
    let mut seen = HashSet::new();
    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("mailto:"))
        .filter_map(|href| base_url.join(href).ok())
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_links_found() {
        let html = r##"
            <html><body>
                <header><nav><a href="/">Home</a><a href="/pricing">Pricing</a></nav></header>
                <div class="docs-sidebar">
                    <a href="/guide/one">One</a>
                    <a href="/guide/two">Two</a>
                    <a href="#top">Top</a>
                    <a href="mailto:help@example.com">Mail</a>
                    <a href="/guide/three">Three</a>
                </div>
            </body></html>
        "##;
        let base = Url::parse("https://example.com/guide/one").unwrap();
        assert_eq!(
            discover_urls(html, &base),
            vec![
                "https://example.com/guide/one",
                "https://example.com/guide/two",
                "https://example.com/guide/three"
            ]
        );
    }

    #[test]
    fn test_too_few_links_is_not_a_sidebar() {
        let html = r#"<html><body><aside><a href="/a">A</a><a href="/b">B</a></aside></body></html>"#;
        let base = Url::parse("https://example.com/a").unwrap();
        assert!(discover_urls(html, &base).is_empty());
    }

    #[test]
    fn test_header_nav_is_ignored() {
        let html = r#"<html><body><nav><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a></nav></body></html>"#;
        let base = Url::parse("https://example.com/a").unwrap();
        assert!(discover_urls(html, &base).is_empty());
    }

    #[test]
    fn test_fragment_links_do_not_count_towards_sidebar() {
        let html = r##"<html><body><aside>
            <a href="/a">A</a><a href="#one">One</a><a href="#two">Two</a><a href="/b">B</a>
        </aside></body></html>"##;
        let base = Url::parse("https://example.com/a").unwrap();
        assert!(discover_urls(html, &base).is_empty());
    }

    #[test]
    fn test_skip_matches_raw_href_not_resolved_url() {
        let html = r##"<html><body><aside>
            <a href="#top">Top</a>
            <a href="https://example.com/a#top">Intro</a>
            <a href="/b">B</a>
            <a href="/c">C</a>
        </aside></body></html>"##;
        let base = Url::parse("https://example.com/a").unwrap();
        assert_eq!(
            discover_urls(html, &base),
            vec!["https://example.com/a#top", "https://example.com/b", "https://example.com/c"]
        );
    }
}
