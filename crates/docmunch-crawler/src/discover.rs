use crate::boundary::CrawlScope;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Platform-supplied discovery for navigation that is not expressed as plain
/// anchors. Returned strings may be invalid; they are filtered by the caller.
pub type DiscoverFn = fn(html: &str, base_url: &Url) -> Vec<String>;

/// Where candidate links on a page come from.
#[derive(Clone)]
pub enum LinkSource {
    /// Anchors matched by a selector scoped to the navigation chrome.
    Navigation(String),
    /// Links produced by a platform discovery function.
    Custom(DiscoverFn),
    /// Every `a[href]` on the page. Not navigation-scoped.
    AllAnchors,
}

impl fmt::Debug for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSource::Navigation(selector) => f.debug_tuple("Navigation").field(selector).finish(),
            LinkSource::Custom(_) => f.write_str("Custom(..)"),
            LinkSource::AllAnchors => f.write_str("AllAnchors"),
        }
    }
}

impl LinkSource {
    /// Only navigation-scoped sources may widen the crawl boundary. Widening
    /// from every anchor on a page would collapse the prefix to `/`.
    pub fn is_nav_scoped(&self) -> bool {
        !matches!(self, LinkSource::AllAnchors)
    }

    /// Raw candidate URLs for a page, unfiltered.
    pub fn candidates(&self, html: &str, base_url: &Url) -> Vec<String> {
        match self {
            LinkSource::Navigation(selector) => select_hrefs(html, base_url, selector),
            LinkSource::Custom(discover) => discover(html, base_url),
            LinkSource::AllAnchors => select_hrefs(html, base_url, "a[href]"),
        }
    }
}

/// In-bounds links on a page, first-seen order, without duplicates.
pub fn discover_links(
    source: &LinkSource,
    html: &str,
    base_url: &Url,
    scope: &CrawlScope,
) -> Vec<Url> {
    filter_unique(source.candidates(html, base_url), |url| scope.contains(url))
}

/// Same-origin links on a page regardless of path prefix. This is the sample
/// used to widen the boundary on the first page.
pub fn discover_same_origin(
    source: &LinkSource,
    html: &str,
    base_url: &Url,
    scope: &CrawlScope,
) -> Vec<Url> {
    filter_unique(source.candidates(html, base_url), |url| {
        scope.is_same_origin(url)
    })
}

/// Resolves the `href` of every element matching `selector` against
/// `base_url`. Hrefs that do not resolve are dropped.
pub fn select_hrefs(html: &str, base_url: &Url, selector: &str) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid link selector '{}': {}", selector, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base_url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!(
                    "Failed to join URL '{}' with base '{}': {}",
                    href,
                    base_url,
                    e
                );
                None
            }
        })
        .collect()
}

fn filter_unique(candidates: Vec<String>, keep: impl Fn(&Url) -> bool) -> Vec<Url> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| Url::parse(&candidate).ok())
        .filter(|url| keep(url))
        .filter(|url| seen.insert(url.to_string()))
        .collect()
}
